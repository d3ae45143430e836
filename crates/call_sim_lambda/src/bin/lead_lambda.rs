use call_sim_lambda::adapters::bigquery::BigQueryRowSink;
use call_sim_lambda::adapters::dynamodb::DynamoConfigStore;
use call_sim_lambda::handlers::lead::{handle_lead_event, LeadHandlerConfig};
use call_sim_lambda::settings::RuntimeSettings;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

struct RuntimeDependencies {
    handler_config: LeadHandlerConfig,
    config_store: DynamoConfigStore,
    row_sink: BigQueryRowSink,
    seed: Option<u64>,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<String, Error> {
    let mut rng = match deps.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let outcomes = handle_lead_event(
        &event.payload,
        &deps.handler_config,
        &deps.config_store,
        &deps.row_sink,
        &mut rng,
    )
    .map_err(|error| Error::from(error.to_string()))?;

    Ok(outcomes
        .iter()
        .map(|outcome| outcome.summary())
        .collect::<Vec<_>>()
        .join("\n"))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let settings = RuntimeSettings::from_env().map_err(|error| Error::from(error.to_string()))?;
    tracing::info!(component = "lead_lambda", event = "settings_loaded", settings = ?settings);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        handler_config: LeadHandlerConfig {
            collection: settings.config_collection.clone(),
            document: settings.config_document.clone(),
        },
        config_store: DynamoConfigStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            settings.config_key_attribute.clone(),
        ),
        row_sink: BigQueryRowSink::new(
            reqwest::Client::new(),
            settings.bigquery_endpoint.clone(),
            settings.bigquery_project_id.clone(),
            settings.bigquery_access_token.clone(),
        ),
        seed: settings.seed,
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| handle_request(event, deps))).await
}
