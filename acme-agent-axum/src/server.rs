use std::net::SocketAddr;
use std::sync::Arc;

use a2a_types::AgentCard;
use acme_agent::card::AGENT_CARD_PATH;
use acme_agent::registry::CapabilityRegistry;
use acme_agent::request_handler::RequestHandler;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::Result;
use crate::routes::{create_routes, ServerState};

/// A2A protocol server for the ACME agent
pub struct A2AServer {
    handler: RequestHandler,
    card: Arc<AgentCard>,
}

impl A2AServer {
    /// Create a new A2A server builder
    pub fn builder(registry: CapabilityRegistry, card: AgentCard) -> A2AServerBuilder {
        A2AServerBuilder::new(registry, card)
    }

    fn display_server_info(&self, local_addr: &SocketAddr) {
        let card = &self.card;
        tracing::info!("A2A server listening at http://{local_addr}");
        tracing::info!("Agent: {} ({})", card.name, card.description);
        tracing::info!("Agent card: http://{local_addr}{AGENT_CARD_PATH}");
        tracing::info!("JSON-RPC endpoint: {}", card.url);
        for interface in &card.additional_interfaces {
            tracing::info!("  interface: {:?} at {}", interface.transport, interface.url);
        }
        tracing::info!("Version: {}, protocol {}", card.version, card.protocol_version);

        if card.skills.is_empty() {
            tracing::warn!("No skills configured");
        } else {
            for skill in &card.skills {
                tracing::info!("  skill: {} ({})", skill.name, skill.id);
            }
        }
    }

    /// Convert the server into an Axum router
    pub fn into_router(self) -> Router {
        let state = ServerState {
            handler: self.handler,
            card: self.card,
        };

        create_routes(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Run the server on the specified address
    ///
    /// # Errors
    ///
    /// Fails when the address cannot be bound or the server stops with an I/O error.
    pub async fn serve(self, addr: impl tokio::net::ToSocketAddrs) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        self.display_server_info(&local_addr);

        let app = self.into_router();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Builder for configuring an A2A server
pub struct A2AServerBuilder {
    registry: CapabilityRegistry,
    card: AgentCard,
}

impl A2AServerBuilder {
    fn new(registry: CapabilityRegistry, card: AgentCard) -> Self {
        Self { registry, card }
    }

    /// Build the A2A server
    pub fn build(self) -> A2AServer {
        A2AServer {
            handler: RequestHandler::new(Arc::new(self.registry)),
            card: Arc::new(self.card),
        }
    }
}
