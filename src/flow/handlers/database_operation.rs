//! Database-operation nodes create or update free-form records in the bot's database.

use super::HandlerResult;

use crate::{
    designer::{
        models::{DatabaseOperation, DatabaseUpdateOperation},
        schemas::{CreateDatabaseRecord, UpdateDatabaseRecords},
        Api,
    },
    flow::variables::{replace_data_variables, replace_text_variables, Variables},
};

use serde_json::Value;
use tracing::{event, instrument, Level};

async fn update_records(
    api: &Api,
    operation: &DatabaseUpdateOperation,
    variables: &Variables,
) -> Result<(), crate::errors::FlowErrorKind> {
    let (new_data, lookup_field_value) = tokio::join!(
        replace_data_variables(&operation.new_data, variables, true),
        replace_text_variables(&operation.lookup_field_value, variables),
    );

    // The filter is matched against the record's serialized JSON,
    // so the lookup value is passed in its JSON form
    let search = format!(
        "\"{name}\": {value}",
        name = operation.lookup_field_name,
        value = Value::String(lookup_field_value),
    );

    let updated = api
        .update_database_records(
            &UpdateDatabaseRecords {
                data: new_data.clone(),
            },
            !operation.overwrite,
            &search,
        )
        .await?;

    if updated.is_empty() && operation.create_if_not_found {
        event!(Level::DEBUG, search, "No records matched, creating one");

        api.create_database_record(&CreateDatabaseRecord { data: new_data })
            .await?;
    }

    Ok(())
}

#[instrument(skip(api, database_operation, variables), fields(database_operation_id = database_operation.id))]
pub async fn handle(
    api: &Api,
    database_operation: &DatabaseOperation,
    variables: &Variables,
) -> HandlerResult {
    if let Some(create_operation) = &database_operation.create_operation {
        let data = replace_data_variables(&create_operation.data, variables, true).await;

        api.create_database_record(&CreateDatabaseRecord { data })
            .await?;
    } else if let Some(update_operation) = &database_operation.update_operation {
        update_records(api, update_operation, variables).await?;
    } else {
        return Ok(None);
    }

    Ok(Some(database_operation.source_connections.clone()))
}
