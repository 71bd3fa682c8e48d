//! Condition nodes gate a branch on a left-folded chain of comparisons.

use super::HandlerResult;

use crate::{
    designer::{
        enums::{ConditionPartNextPartOperator, ConditionPartOperator},
        models::{Condition, ConditionPart},
    },
    flow::variables::{deserialize_text, replace_text_variables, Scalar, Variables},
};

async fn evaluate_part(part: &ConditionPart, variables: &Variables) -> bool {
    let (first_value, second_value) = tokio::join!(
        replace_text_variables(&part.first_value, variables),
        replace_text_variables(&part.second_value, variables),
    );
    let first_value = deserialize_text(&first_value);
    let second_value = deserialize_text(&second_value);

    match part.operator {
        ConditionPartOperator::Equal => first_value.loose_eq(&second_value),
        ConditionPartOperator::NotEqual => !first_value.loose_eq(&second_value),
        // Ordering is defined for non-text operands only; text cuts the comparison to `false`
        _ if first_value.is_text() || second_value.is_text() => false,
        operator => {
            let (Some(first), Some(second)) = (first_value.as_number(), second_value.as_number())
            else {
                return false;
            };

            match operator {
                ConditionPartOperator::Greater => first > second,
                ConditionPartOperator::GreaterOrEqual => first >= second,
                ConditionPartOperator::Less => first < second,
                ConditionPartOperator::LessOrEqual => first <= second,
                ConditionPartOperator::Equal | ConditionPartOperator::NotEqual => unreachable!(),
            }
        }
    }
}

pub async fn handle(condition: &Condition, variables: &Variables) -> HandlerResult {
    let mut result: Option<bool> = None;
    let mut pending_operator: Option<ConditionPartNextPartOperator> = None;

    for part in &condition.parts {
        let current_result = evaluate_part(part, variables).await;

        result = Some(match (result, pending_operator) {
            (None, _) => current_result,
            (Some(previous), Some(ConditionPartNextPartOperator::And)) => {
                previous && current_result
            }
            (Some(previous), Some(ConditionPartNextPartOperator::Or)) => {
                previous || current_result
            }
            // A part not linked by the previous one is dropped from the fold
            (Some(previous), None) => previous,
        });
        pending_operator = part.next_part_operator;
    }

    if result.unwrap_or(false) {
        Ok(Some(condition.source_connections.clone()))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::designer::{enums::ConditionPartType, Api};
    use crate::types::User;

    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    fn variables() -> Variables {
        let api = Arc::new(Api::new(
            &Url::parse("http://designer.test").unwrap(),
            "token",
            1,
        ));

        Variables::new(api, &User::new(1, true, "Test Bot"), None, None)
    }

    fn part(
        first_value: &str,
        operator: ConditionPartOperator,
        second_value: &str,
        next_part_operator: Option<ConditionPartNextPartOperator>,
    ) -> ConditionPart {
        ConditionPart {
            id: 1,
            part_type: ConditionPartType::Positive,
            first_value: first_value.to_owned(),
            operator,
            second_value: second_value.to_owned(),
            next_part_operator,
        }
    }

    fn condition(parts: Vec<ConditionPart>) -> Condition {
        Condition {
            id: 1,
            parts,
            source_connections: vec![],
        }
    }

    #[tokio::test]
    async fn numeric_comparison() {
        let variables = variables();
        let condition = condition(vec![part("7", ConditionPartOperator::Greater, "5", None)]);

        assert!(handle(&condition, &variables).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn ordering_with_text_operand_is_false() {
        let mut variables = variables();
        variables.add("X", json!("abc"));

        // An unresolved marker stays literal and is a string operand
        let unresolved = condition(vec![part(
            "{{MISSING}}",
            ConditionPartOperator::Greater,
            "10",
            None,
        )]);
        let resolved_text = condition(vec![part(
            "{{X}}",
            ConditionPartOperator::Less,
            "10",
            None,
        )]);

        assert!(handle(&unresolved, &variables).await.unwrap().is_none());
        assert!(handle(&resolved_text, &variables).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn equality_is_total_across_mixed_types() {
        let variables = variables();

        let mixed_eq = condition(vec![part("abc", ConditionPartOperator::Equal, "5", None)]);
        let mixed_ne = condition(vec![part("abc", ConditionPartOperator::NotEqual, "5", None)]);
        let int_float = condition(vec![part("1", ConditionPartOperator::Equal, "1.0", None)]);

        assert!(handle(&mixed_eq, &variables).await.unwrap().is_none());
        assert!(handle(&mixed_ne, &variables).await.unwrap().is_some());
        assert!(handle(&int_float, &variables).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn parts_fold_left_to_right() {
        let variables = variables();

        // (true && false) || true == true
        let chained = condition(vec![
            part(
                "1",
                ConditionPartOperator::Equal,
                "1",
                Some(ConditionPartNextPartOperator::And),
            ),
            part(
                "1",
                ConditionPartOperator::Equal,
                "2",
                Some(ConditionPartNextPartOperator::Or),
            ),
            part("true", ConditionPartOperator::Equal, "TRUE", None),
        ]);

        assert!(handle(&chained, &variables).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_parts_cut_the_branch() {
        let variables = variables();

        assert!(handle(&condition(vec![]), &variables)
            .await
            .unwrap()
            .is_none());
    }
}
