//! Agent card assembly.

use a2a_types::{AgentCapabilities, AgentCard, AgentProvider, AgentSkill, TransportProtocol};

use crate::config::AgentConfig;

/// Path of the JSON-RPC endpoint relative to the base URL.
pub const JSONRPC_PATH: &str = "/a2a/jsonrpc";

/// Base path of the HTTP+JSON (REST) transport relative to the base URL.
pub const REST_PATH: &str = "/a2a/rest";

/// Well-known path the card is served from.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Builds the card advertised at [`AGENT_CARD_PATH`].
///
/// `base_url` is the externally reachable origin (no trailing slash); the
/// card's URL and its JSON-RPC interface both point at `<base_url>/a2a/jsonrpc`;
/// the HTTP+JSON interface points at `<base_url>/a2a/rest`.
#[must_use]
pub fn build_agent_card(config: &AgentConfig, base_url: &str, skills: &[AgentSkill]) -> AgentCard {
    let base_url = base_url.trim_end_matches('/');
    let endpoint = format!("{base_url}{JSONRPC_PATH}");
    let card = &config.card;

    AgentCard::new(&card.name, &card.description, &card.version, &endpoint)
        .with_capabilities(AgentCapabilities {
            streaming: Some(false),
            push_notifications: Some(false),
        })
        .with_skills(skills.to_vec())
        .with_provider(card.provider.as_ref().map(|provider| AgentProvider {
            organization: provider.organization.clone(),
            url: provider.url.clone(),
        }))
        .with_documentation_url(card.documentation_url.clone())
        .add_interface(TransportProtocol::JsonRpc, endpoint)
        .add_interface(TransportProtocol::HttpJson, format!("{base_url}{REST_PATH}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::LlmCapability;

    #[test]
    fn card_points_at_jsonrpc_endpoint() {
        let config = AgentConfig::default();
        let card = build_agent_card(
            &config,
            "http://localhost:4000/",
            &[LlmCapability::skill_metadata()],
        );

        assert_eq!(card.name, "ACME Agent");
        assert_eq!(card.protocol_version, "0.3.0");
        assert_eq!(card.url, "http://localhost:4000/a2a/jsonrpc");
        assert_eq!(card.capabilities.streaming, Some(false));
        assert_eq!(card.capabilities.push_notifications, Some(false));
        assert_eq!(card.default_input_modes, vec!["text"]);
        assert_eq!(card.default_output_modes, vec!["text"]);
        assert_eq!(card.skills[0].id, "goat-farming-consultation");
        assert_eq!(
            card.provider.as_ref().map(|p| p.organization.as_str()),
            Some("ACME Corp")
        );
        assert_eq!(card.additional_interfaces.len(), 2);
        assert_eq!(card.additional_interfaces[0].url, card.url);
        assert_eq!(
            card.additional_interfaces[1].transport,
            TransportProtocol::HttpJson
        );
        assert_eq!(
            card.additional_interfaces[1].url,
            "http://localhost:4000/a2a/rest"
        );
    }
}
