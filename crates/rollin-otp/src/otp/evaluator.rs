//! Evaluator: turns stored [`OtpParameters`] into a code, a verification
//! verdict, or the next refresh deadline.
//!
//! The evaluator is a plain value holding an immutable [`EvaluatorConfig`].
//! Every method is pure apart from reading the wall clock in the
//! convenience wrappers that don't take an explicit `now`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::otp::base32::Base32Codec;
use crate::otp::buffer::{constant_time_eq, SecretBuffer};
use crate::otp::hexcodec::HexCodec;
use crate::otp::types::*;
use crate::otp::{hotp, totp};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tunables for [`OtpEvaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Refresh interval reported when no TOTP entry exists.
    pub hotp_poll_interval_secs: u32,
    /// Shortest refresh interval ever reported.
    pub minimum_poll_interval_ms: u32,
    /// Strip spaces/dashes, upper-case and pad Base32 secrets before decoding.
    pub normalise_base32: bool,
    /// Windows (TOTP) or counters (HOTP) checked by [`OtpEvaluator::verify`].
    pub verify_drift_window: u32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            hotp_poll_interval_secs: 30,
            minimum_poll_interval_ms: 500,
            normalise_base32: true,
            verify_drift_window: 1,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Evaluator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default)]
pub struct OtpEvaluator {
    config: EvaluatorConfig,
}

impl OtpEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Generate the code for `params` at the current time.
    pub fn evaluate(&self, params: &OtpParameters) -> OtpResult {
        self.evaluate_at(params, totp::current_unix_time())
    }

    /// Generate the code for `params` at `now` (unix seconds). HOTP entries
    /// ignore `now`.
    pub fn evaluate_at(&self, params: &OtpParameters, now: u64) -> OtpResult {
        let result = self.generate(params, now);
        if let Err(e) = &result {
            log::warn!(
                "OTP evaluation failed for '{}': {:?}",
                params.identifier,
                e.kind
            );
        }
        result
    }

    fn generate(&self, params: &OtpParameters, now: u64) -> OtpResult {
        params.validate()?;
        let key = self.decode_secret(params)?;

        match params.kind {
            OtpKind::Totp => {
                let step = params.time_step;
                let counter = totp::counter_at(now, step, params.time_offset)?;
                let code =
                    hotp::calculate(key.as_slice(), counter, params.digits, params.algorithm)?;
                // Windows start at `time_offset`; elapsed stays epoch-relative.
                let since_start = now - params.time_offset;
                Ok(GeneratedCode {
                    identifier: params.identifier.clone(),
                    code,
                    kind: OtpKind::Totp,
                    counter,
                    elapsed_seconds: totp::seconds_elapsed_at(now, step),
                    remaining_seconds: totp::seconds_remaining_at(since_start, step),
                    time_step: step,
                    progress: totp::progress_fraction_at(since_start, step),
                })
            }
            OtpKind::Hotp => {
                let code = hotp::calculate(
                    key.as_slice(),
                    params.counter,
                    params.digits,
                    params.algorithm,
                )?;
                Ok(GeneratedCode {
                    identifier: params.identifier.clone(),
                    code,
                    kind: OtpKind::Hotp,
                    counter: params.counter,
                    elapsed_seconds: 0,
                    remaining_seconds: 0,
                    time_step: 0,
                    progress: 0.0,
                })
            }
        }
    }

    /// Decode the stored secret with the codec its encoding names.
    pub fn decode_secret(&self, params: &OtpParameters) -> Result<SecretBuffer, OtpError> {
        let decoded = match params.encoding {
            KeyEncoding::Base32 if self.config.normalise_base32 => {
                let normalised = Zeroizing::new(params.normalised_secret());
                Base32Codec::decode(&normalised)
            }
            KeyEncoding::Base32 => Base32Codec::decode(&params.secret),
            KeyEncoding::Hex => HexCodec::decode(&params.secret),
        };
        decoded.map_err(|e| {
            OtpError::new(OtpErrorKind::DecodeFailure, "secret decode failed")
                .with_detail(e.message)
        })
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Verification
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Verify `code` at the current time with the configured drift window.
    pub fn verify(&self, params: &OtpParameters, code: &str) -> Result<VerifyResult, OtpError> {
        self.verify_at(
            params,
            code,
            self.config.verify_drift_window,
            totp::current_unix_time(),
        )
    }

    /// Verify `code` at `now`.
    ///
    /// TOTP checks `drift_window` windows either side of the current one;
    /// HOTP checks the stored counter and `drift_window` counters ahead.
    /// A candidate of the wrong length or with non-digits is simply invalid.
    pub fn verify_at(
        &self,
        params: &OtpParameters,
        code: &str,
        drift_window: u32,
        now: u64,
    ) -> Result<VerifyResult, OtpError> {
        params.validate()?;
        let key = self.decode_secret(params)?;

        let base_counter = match params.kind {
            OtpKind::Totp => totp::counter_at(now, params.time_step, params.time_offset)?,
            OtpKind::Hotp => params.counter,
        };

        if code.len() != params.digits as usize || !code.bytes().all(|c| c.is_ascii_digit()) {
            return Ok(VerifyResult {
                valid: false,
                drift: 0,
                matched_counter: None,
            });
        }

        let start = match params.kind {
            OtpKind::Hotp => base_counter,
            OtpKind::Totp => base_counter.saturating_sub(u64::from(drift_window)),
        };
        let end = base_counter.saturating_add(u64::from(drift_window));

        for c in start..=end {
            let generated = hotp::calculate(key.as_slice(), c, params.digits, params.algorithm)?;
            if constant_time_eq(generated.as_bytes(), code.as_bytes()) {
                return Ok(VerifyResult {
                    valid: true,
                    // |drift| <= drift_window, so the wrapped difference is exact.
                    drift: c.wrapping_sub(base_counter) as i64,
                    matched_counter: Some(c),
                });
            }
        }

        Ok(VerifyResult {
            valid: false,
            drift: 0,
            matched_counter: None,
        })
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Refresh scheduling
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// How long a caller may wait before some entry's code changes.
    ///
    /// The shortest wait until a TOTP entry's counter rolls over (windows
    /// counted from each entry's `time_offset`), never less than the
    /// configured minimum. With no usable TOTP entry the HOTP poll interval
    /// is returned.
    pub fn next_refresh_interval(&self, entries: &[OtpParameters], now: u64) -> Duration {
        let shortest = entries
            .iter()
            .filter(|p| p.kind == OtpKind::Totp && p.time_step > 0)
            .map(|p| totp::seconds_until_rollover(now, p.time_step, p.time_offset))
            .min();

        let minimum = Duration::from_millis(u64::from(self.config.minimum_poll_interval_ms));
        match shortest {
            Some(secs) => {
                log::debug!("next OTP refresh in {} second(s)", secs);
                Duration::from_secs(secs).max(minimum)
            }
            None => {
                Duration::from_secs(u64::from(self.config.hotp_poll_interval_secs)).max(minimum)
            }
        }
    }
}
