//! W3C Trace Context propagation for outgoing requests.
//!
//! Uses manual header manipulation rather than a full OpenTelemetry
//! propagator: each request gets a fresh `traceparent` whose trace id is
//! recorded on the request span for correlation with server logs.

use http::{HeaderMap, HeaderName, HeaderValue};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParent {
    pub trace_id: String,
    pub span_id: String,
    pub sampled: bool,
}

impl TraceParent {
    pub fn random() -> Self {
        Self {
            trace_id: format!("{:032x}", rand::random::<u128>()),
            span_id: format!("{:016x}", rand::random::<u64>()),
            sampled: true,
        }
    }

    pub fn to_header_value(&self) -> String {
        let flags = if self.sampled { "01" } else { "00" };
        format!("00-{}-{}-{}", self.trace_id, self.span_id, flags)
    }

    /// Parse a version-00 `traceparent` value.
    #[cfg(test)]
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let (version, trace_id, span_id, flags) =
            (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || version != "00" {
            return None;
        }
        let is_hex = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit());
        if !is_hex(trace_id, 32) || !is_hex(span_id, 16) || !is_hex(flags, 2) {
            return None;
        }
        Some(Self {
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
            sampled: u8::from_str_radix(flags, 16).ok()? & 0x01 == 1,
        })
    }
}

/// Insert a fresh `traceparent` header and return the context that was used.
pub fn inject_trace_context(headers: &mut HeaderMap) -> TraceParent {
    let ctx = TraceParent::random();
    if let Ok(value) = HeaderValue::from_str(&ctx.to_header_value()) {
        headers.insert(HeaderName::from_static(TRACEPARENT), value);
    }
    ctx
}
