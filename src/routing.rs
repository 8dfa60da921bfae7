// src/routing.rs
// Bridge between categorization results and the storage collaborator that
// owns the department queues. Validation lives here; persistence does not.

use async_trait::async_trait;
use tracing::{error, info};

use crate::classifier::ClassificationResult;
use crate::config::TriageConfig;
use crate::error::RoutingError;

/// Storage-side collaborator that records a classification against a ticket.
/// This crate never reads or writes storage itself.
#[async_trait]
pub trait ClassificationSink: Send + Sync {
    async fn assign_department(
        &self,
        ticket_id: i64,
        result: &ClassificationResult,
    ) -> anyhow::Result<()>;
}

/// Route a classified ticket to its department queue. The result is
/// validated against the configured department set before anything reaches
/// the sink; an invalid pair is never persisted.
pub async fn route_ticket(
    sink: &dyn ClassificationSink,
    config: &TriageConfig,
    ticket_id: i64,
    result: &ClassificationResult,
) -> Result<(), RoutingError> {
    if config.find_department(&result.department).is_none() {
        error!("Invalid department: {}", result.department);
        return Err(RoutingError::UnknownDepartment {
            department: result.department.clone(),
            valid: config.department_names().join(", "),
        });
    }

    if result.confidence > 100 {
        error!("Invalid confidence score: {}", result.confidence);
        return Err(RoutingError::InvalidConfidence(result.confidence));
    }

    sink.assign_department(ticket_id, result)
        .await
        .map_err(|e| {
            error!("Failed to route ticket {ticket_id} to {}: {e}", result.department);
            RoutingError::Sink(e.to_string())
        })?;

    info!(
        "Successfully routed ticket {} to {} department",
        ticket_id, result.department
    );
    Ok(())
}

/// Manual override path: reroute a ticket, e.g. when the original
/// categorization was wrong or business rules changed. Same validation,
/// same sink.
pub async fn reroute_ticket(
    sink: &dyn ClassificationSink,
    config: &TriageConfig,
    ticket_id: i64,
    result: &ClassificationResult,
) -> Result<(), RoutingError> {
    info!("Rerouting ticket {} to {}", ticket_id, result.department);
    route_ticket(sink, config, ticket_id, result).await
}
