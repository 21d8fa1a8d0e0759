//! Modelo estadístico de salud sobre una muestra de actividades.
//!
//! Dos métricas:
//! - `overall`: porcentaje simple de éxitos (status != Fail) sobre el total.
//! - `current`: puntaje con decaimiento temporal donde sólo los fallos
//!   restan, ponderados por su antigüedad respecto de la muestra más
//!   reciente. Un fallo reciente pesa mucho más que uno viejo; una racha
//!   larga de éxitos antiguos no compensa un fallo fresco.
//!
//! Sin muestras ambos devuelven el marcador "sin datos" (NaN), que nunca se
//! coacciona a 0 ni a 100 y queda excluido de cualquier ranking.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::model::ActivityStatus;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Porcentaje comparable entre clouds/templates. El marcador sin-datos es
/// NaN: `PartialOrd` lo deja naturalmente fuera de todo ordenamiento.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Self {
        Percentage(value)
    }

    pub fn no_data() -> Self {
        Percentage(f64::NAN)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_defined(self) -> bool {
        !self.0.is_nan()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            f.write_str("N/A")
        } else {
            write!(f, "{:.1}%", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    started_at: DateTime<Utc>,
    failed: bool,
}

pub struct Health {
    // Ordenadas por inicio ascendente para que la ponderación sea
    // determinista independientemente del orden de entrada.
    samples: Vec<Sample>,
}

impl Health {
    pub fn new(activities: &[Arc<Activity>]) -> Self {
        let mut samples: Vec<Sample> = activities.iter()
                                                 .map(|a| Sample { started_at: a.started_at(),
                                                                   failed: a.status() == ActivityStatus::Fail })
                                                 .collect();
        samples.sort_by_key(|s| s.started_at);
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// `100 * éxitos / total`; sin muestras, el marcador sin-datos.
    pub fn overall(&self) -> Percentage {
        if self.samples.is_empty() {
            return Percentage::no_data();
        }
        let successes = self.samples.iter().filter(|s| !s.failed).count();
        Percentage::new(100.0 * successes as f64 / self.samples.len() as f64)
    }

    /// Puntaje con decaimiento temporal. Referencia: la muestra más
    /// reciente. Cada fallo resta `1 / (n * age_hours)` con
    /// `age_hours = millis(referencia - inicio) / 3_600_000 + 1`
    /// (el +1 evita dividir por cero en la muestra más nueva).
    pub fn current(&self) -> Percentage {
        let Some(newest) = self.samples.last() else {
            return Percentage::no_data();
        };
        let reference = newest.started_at;
        let n = self.samples.len() as f64;
        let mut score = 1.0;
        for sample in &self.samples {
            if !sample.failed {
                continue;
            }
            let age_hours = (reference - sample.started_at).num_milliseconds() as f64
                            / MILLIS_PER_HOUR
                            + 1.0;
            score -= 1.0 / (n * age_hours);
        }
        Percentage::new(score * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivitySnapshot;
    use crate::model::{ActivityId, Attachment, ProvisioningPhase};
    use chrono::Duration;

    // Construye una actividad completada con inicio controlado (vía
    // snapshot) para poder verificar la fórmula de decaimiento.
    fn sample_at(started_at: DateTime<Utc>, failed: bool) -> Arc<Activity> {
        let activity = Activity::new(ActivityId::new("CloudA", "n"));
        if failed {
            activity.attach(ProvisioningPhase::Provisioning, Attachment::failure("boom", None))
                    .unwrap();
        }
        activity.force_complete();
        let mut snapshot: ActivitySnapshot = activity.to_snapshot();
        for execution in snapshot.executions.values_mut() {
            execution.started_at = started_at;
        }
        Arc::new(Activity::from_snapshot(snapshot))
    }

    #[test]
    fn no_samples_yield_the_no_data_marker() {
        let health = Health::new(&[]);
        assert!(!health.overall().is_defined());
        assert!(!health.current().is_defined());
        assert_eq!(health.overall().to_string(), "N/A");
    }

    #[test]
    fn all_successes_score_a_hundred() {
        let now = Utc::now();
        let samples: Vec<_> = (0..5).map(|i| sample_at(now - Duration::minutes(i), false)).collect();
        let health = Health::new(&samples);
        assert_eq!(health.overall().value(), 100.0);
        assert_eq!(health.current().value(), 100.0);
    }

    #[test]
    fn two_to_one_mix_renders_sixty_six_point_seven() {
        let now = Utc::now();
        let samples = vec![sample_at(now - Duration::hours(2), false),
                           sample_at(now - Duration::hours(1), false),
                           sample_at(now, true)];
        let health = Health::new(&samples);
        assert_eq!(health.overall().to_string(), "66.7%");
    }

    #[test]
    fn recent_failures_hurt_more_than_old_ones() {
        let now = Utc::now();

        // Un éxito viejo + un fallo reciente (edad ~0h => resta 1/(2*1))
        let recent_fail = Health::new(&[sample_at(now - Duration::hours(48), false),
                                        sample_at(now, true)]);
        // Un fallo viejo (47h) + un éxito reciente (edad 47h => resta 1/(2*48))
        let old_fail = Health::new(&[sample_at(now - Duration::hours(47), true),
                                     sample_at(now, false)]);

        assert!(recent_fail.current() < old_fail.current(),
                "a fresh failure must pull the score down harder");

        // Verificación directa de la fórmula: 100 * (1 - 1/(2*1)) = 50
        assert!((recent_fail.current().value() - 50.0).abs() < 0.01);
        // 100 * (1 - 1/(2*48)) ≈ 98.96
        assert!((old_fail.current().value() - 98.958).abs() < 0.01);
    }

    #[test]
    fn no_data_is_excluded_from_ordering() {
        assert_eq!(Percentage::no_data().partial_cmp(&Percentage::new(10.0)), None);
        assert!(Percentage::new(50.0) < Percentage::new(66.7));
    }
}
