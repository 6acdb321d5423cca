use acme_agent::card::build_agent_card;
use acme_agent::config::AgentConfig;
use acme_agent::observability::init_tracing;
use acme_agent::registry::CapabilityRegistry;
use acme_agent::AgentError;
use acme_agent_axum::A2AServer;

#[tokio::main]
async fn main() -> acme_agent_axum::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();

    let config = AgentConfig::load()?;
    init_tracing(&config.logging)?;

    let registry = CapabilityRegistry::from_config(&config, None)?;
    let card = build_agent_card(&config, &config.server.base_url(), registry.skills());

    let address = config.server.bind_address();
    tracing::info!(address = %address, capability = ?config.capability.kind, "starting agent");

    A2AServer::builder(registry, card)
        .build()
        .serve(address.as_str())
        .await
        .map_err(|err| match err {
            acme_agent_axum::Error::Io(io) => AgentError::ServerStartFailed(io.to_string()).into(),
            other => other,
        })
}
