//! OpenTelemetry span helpers for transfer operations
//!
//! Span names are static, attributes are structured, and error details are
//! recorded into the `error.*` fields so they show up on the span itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use cctp_transfer::spans;
//! use cctp_transfer::DomainId;
//!
//! let span = spans::await_attestation("0xabc", DomainId::Ethereum, 5);
//! let _guard = span.enter();
//! // custom polling logic here
//! ```

use alloy_primitives::{B256, U256};
use tracing::Span;

use crate::chain::ChainId;
use crate::protocol::{DomainId, FinalityThreshold};

/// Create span for a whole transfer, from approval to mint.
///
/// Parent: caller
/// Children: every step span below
#[inline]
pub fn execute_transfer(
    source_chain: ChainId,
    destination_chain: ChainId,
    amount: &str,
    finality: FinalityThreshold,
    generation: u64,
) -> Span {
    tracing::info_span!(
        "cctp_transfer.execute_transfer",
        source_chain = source_chain,
        destination_chain = destination_chain,
        amount = amount,
        finality = finality.as_u32(),
        generation = generation,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for building an account-chain `depositForBurn`.
#[inline]
pub fn deposit_for_burn(
    from_address: &str,
    mint_recipient: &B256,
    destination_domain: u32,
    amount: &U256,
) -> Span {
    tracing::info_span!(
        "cctp_transfer.deposit_for_burn",
        from_address = from_address,
        mint_recipient = %mint_recipient,
        destination_domain = destination_domain,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for building a program-chain `deposit_for_burn` instruction.
#[inline]
pub fn program_deposit_for_burn(owner: &str, destination_domain: u32, amount: u64) -> Span {
    tracing::info_span!(
        "cctp_transfer.program_deposit_for_burn",
        owner = owner,
        destination_domain = destination_domain,
        amount = amount,
    )
}

/// Create span for polling Iris until the burn is attested.
///
/// Parent: cctp_transfer.execute_transfer
/// Children: cctp_transfer.get_messages (one per poll)
#[inline]
pub fn await_attestation(tx_id: &str, source_domain: DomainId, poll_interval_secs: u64) -> Span {
    tracing::info_span!(
        "cctp_transfer.await_attestation",
        tx_id = tx_id,
        source_domain = source_domain.as_u32(),
        poll_interval_secs = poll_interval_secs,
        attempts = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for one mint attempt on the destination chain.
#[inline]
pub fn receive_message(destination_chain: ChainId, attempt: u32, attestation_length: usize) -> Span {
    tracing::info_span!(
        "cctp_transfer.receive_message",
        destination_chain = destination_chain,
        attempt = attempt,
        attestation_length_bytes = attestation_length,
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error type/variant
/// - error.message: Human-readable error message
/// - error.source: The underlying cause, when there is one
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record("error.type", message.split(':').next().unwrap_or("Unknown"));
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}

/// Record error attributes with custom context on the current span.
///
/// # Example
///
/// ```rust,no_run
/// use cctp_transfer::spans;
///
/// # fn example() {
/// let span = tracing::info_span!("cctp_transfer.operation");
/// let _guard = span.enter();
///
/// spans::record_error_with_context(
///     "AttestationTransportFailed",
///     "Iris API returned HTTP 500",
///     Some("burn tx 0xabc"),
/// );
/// # }
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
