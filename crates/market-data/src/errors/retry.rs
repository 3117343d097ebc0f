/// Classification for retry policy.
///
/// Used by the rate cache to decide how to continue down the provider chain
/// after an attempt fails.
///
/// # Behavior Summary
///
/// | Class | Try another endpoint for the same date? | Keep the provider for later dates? |
/// |-------|----------------------------------------|-----------------------------------|
/// | `Never` | Yes | No |
/// | `NextProvider` | Yes | Yes |
/// | `NextDate` | Yes | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The provider itself is misconfigured.
    /// Calling it again for another date won't help, so it is dropped
    /// for the rest of the resolution.
    Never,

    /// Transient or provider-specific failure (timeout, 429, 5xx).
    /// Another endpoint may still answer for the same date.
    NextProvider,

    /// The provider has no usable rate for this date: nothing published yet,
    /// or a document that failed validation. An earlier business day is
    /// likely to succeed.
    NextDate,
}
