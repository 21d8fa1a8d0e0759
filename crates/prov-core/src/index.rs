//! Índice de solo lectura sobre un snapshot de actividades.
//!
//! Se construye una única vez a partir de una lista inmutable (nunca muta el
//! store) y agrupa por owner y por (owner, sub-owner) para la capa de
//! reporte. Claves desconocidas devuelven secuencias vacías, no errores.

use std::collections::HashMap;
use std::sync::Arc;

use crate::activity::Activity;
use crate::health::Health;
use crate::model::ProvisioningPhase;

pub struct ActivityIndex {
    by_owner: HashMap<String, Vec<Arc<Activity>>>,
    // La clave interna admite el "sub-owner ausente": un owner sin concepto
    // de sub-owner tiene exactamente un bucket con clave None.
    by_sub_owner: HashMap<String, HashMap<Option<String>, Vec<Arc<Activity>>>>,
}

impl ActivityIndex {
    pub fn new(activities: Vec<Arc<Activity>>) -> Self {
        let mut by_owner: HashMap<String, Vec<Arc<Activity>>> = HashMap::new();
        let mut by_sub_owner: HashMap<String, HashMap<Option<String>, Vec<Arc<Activity>>>> =
            HashMap::new();
        for activity in activities {
            let id = activity.id();
            by_owner.entry(id.owner.clone())
                    .or_default()
                    .push(Arc::clone(&activity));
            by_sub_owner.entry(id.owner.clone())
                        .or_default()
                        .entry(id.sub_owner.clone())
                        .or_default()
                        .push(activity);
        }
        Self { by_owner, by_sub_owner }
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.by_owner.keys().map(String::as_str)
    }

    pub fn for_owner(&self, owner: &str) -> &[Arc<Activity>] {
        self.by_owner.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sub_owners(&self, owner: &str) -> impl Iterator<Item = Option<&str>> {
        self.by_sub_owner
            .get(owner)
            .into_iter()
            .flat_map(|m| m.keys().map(Option::as_deref))
    }

    pub fn for_sub_owner(&self, owner: &str, sub_owner: Option<&str>) -> &[Arc<Activity>] {
        self.by_sub_owner
            .get(owner)
            .and_then(|m| m.get(&sub_owner.map(str::to_string)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn health_for_owner(&self, owner: &str) -> Health {
        Self::health_of(self.for_owner(owner))
    }

    pub fn health_for_sub_owner(&self, owner: &str, sub_owner: Option<&str>) -> Health {
        Self::health_of(self.for_sub_owner(owner, sub_owner))
    }

    // Sólo muestrean salud las actividades que ya probaron éxito o fracaso:
    // las que siguen en Provisioning/Launching quedan fuera.
    fn health_of(activities: &[Arc<Activity>]) -> Health {
        let samples: Vec<Arc<Activity>> =
            activities.iter()
                      .filter(|a| a.current_phase() >= ProvisioningPhase::Operating)
                      .cloned()
                      .collect();
        Health::new(&samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActivityId;

    fn started(owner: &str, sub: Option<&str>, name: &str) -> Arc<Activity> {
        let id = match sub {
            Some(sub) => ActivityId::with_sub_owner(owner, sub, name),
            None => ActivityId::new(owner, name),
        };
        Arc::new(Activity::new(id))
    }

    #[test]
    fn groups_by_owner_and_sub_owner() {
        let a1 = started("CloudA", Some("tmplX"), "n1");
        let a2 = started("CloudA", Some("tmplY"), "n2");
        let a3 = started("CloudA", Some("tmplX"), "n3");
        let b1 = started("CloudB", None, "n4");
        let index = ActivityIndex::new(vec![a1, a2, a3, b1]);

        assert_eq!(index.for_owner("CloudA").len(), 3);
        assert_eq!(index.for_owner("CloudB").len(), 1);
        assert_eq!(index.for_sub_owner("CloudA", Some("tmplX")).len(), 2);
        assert_eq!(index.for_sub_owner("CloudA", Some("tmplY")).len(), 1);
        // Owner sin sub-owners: exactamente un bucket con clave ausente
        assert_eq!(index.sub_owners("CloudB").collect::<Vec<_>>(), vec![None]);
        assert_eq!(index.for_sub_owner("CloudB", None).len(), 1);
    }

    #[test]
    fn unknown_keys_yield_empty_sequences() {
        let index = ActivityIndex::new(vec![]);
        assert!(index.for_owner("nope").is_empty());
        assert!(index.for_sub_owner("nope", Some("zilch")).is_empty());
        assert!(!index.health_for_owner("nope").overall().is_defined());
    }

    #[test]
    fn health_excludes_in_flight_activities() {
        use crate::model::ProvisioningPhase;

        let proving = started("CloudA", None, "in-flight");
        let operating = started("CloudA", None, "op");
        operating.enter(ProvisioningPhase::Launching).unwrap();
        operating.enter(ProvisioningPhase::Operating).unwrap();

        let index = ActivityIndex::new(vec![proving, operating]);
        let health = index.health_for_owner("CloudA");
        assert_eq!(health.sample_count(), 1, "provisioning/launching are not sampled");
    }
}
