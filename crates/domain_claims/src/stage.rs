//! Degradable pipeline stages
//!
//! Each fallible stage of the claim pipeline is paired with a declared
//! default used on failure, so one stage's error never prevents later
//! stages from running. Only the final persistence step bypasses this
//! combinator.

use std::fmt::Display;
use std::future::Future;

use core_kernel::ClaimId;

/// Runs `op`, substituting `default` on failure.
///
/// The failure is logged with the stage name and claim id for post-hoc
/// diagnosis, then swallowed.
pub async fn degrade<T, E, F>(stage: &'static str, claim_id: ClaimId, default: T, op: F) -> T
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match op.await {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                stage,
                claim_id = %claim_id,
                error = %error,
                "stage failed, continuing with fallback"
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;

    #[tokio::test]
    async fn test_ok_passes_through() {
        let claim_id = ClaimId::new();
        let value = degrade("demo", claim_id, 0, async { Ok::<_, PortError>(7) }).await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_err_yields_default() {
        let claim_id = ClaimId::new();
        let value = degrade("demo", claim_id, 42, async {
            Err::<i32, _>(PortError::connection("down"))
        })
        .await;
        assert_eq!(value, 42);
    }
}
