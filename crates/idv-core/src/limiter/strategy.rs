use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Estrategia de longitud de ventana, seleccionada por configuración.
///
/// Una sola capability con dos variantes: ventana fija o ventana que crece
/// exponencialmente con los lockouts previos del sujeto (hasta un máximo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindowStrategy {
    Fixed,
    ExponentialBackoff { factor: f64, max_window: Duration },
}

impl WindowStrategy {
    /// Longitud de ventana dado el número de lockouts previos del sujeto.
    pub fn window_for(&self, base: Duration, prior_lockouts: u32) -> Duration {
        match self {
            WindowStrategy::Fixed => base,
            WindowStrategy::ExponentialBackoff { factor, max_window } => {
                let scaled = base.as_secs_f64() * factor.powi(prior_lockouts as i32);
                let capped = scaled.min(max_window.as_secs_f64());
                Duration::from_secs_f64(capped.max(0.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ignores_prior_lockouts() {
        let base = Duration::from_secs(600);
        assert_eq!(WindowStrategy::Fixed.window_for(base, 0), base);
        assert_eq!(WindowStrategy::Fixed.window_for(base, 5), base);
    }

    #[test]
    fn exponential_grows_and_caps() {
        let strategy = WindowStrategy::ExponentialBackoff {
            factor: 2.0,
            max_window: Duration::from_secs(3600),
        };
        let base = Duration::from_secs(600);
        assert_eq!(strategy.window_for(base, 0), Duration::from_secs(600));
        assert_eq!(strategy.window_for(base, 1), Duration::from_secs(1200));
        assert_eq!(strategy.window_for(base, 2), Duration::from_secs(2400));
        // 600 * 2^3 = 4800 > cap
        assert_eq!(strategy.window_for(base, 3), Duration::from_secs(3600));
    }
}
