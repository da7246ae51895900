use crate::dto::HealthRes;

/// Health check shared by every API surface.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Reports that the service is alive.
    ///
    /// # Returns
    /// * `HealthRes` - Always `ok: true`; the check performs no I/O.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "guardia is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_alive() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "guardia is alive");
    }
}
