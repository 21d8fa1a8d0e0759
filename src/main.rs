//! Demo del motor de seguimiento: simula un ciclo de aprovisionamiento con
//! éxito, un fallo y un barrido, y reporta el estado y la salud por owner.

use provstats_rust::config::CONFIG;
use provstats_rust::{ActivityId, ProvisioningMonitor, ProvisioningPhase};

fn main() {
    env_logger::init();

    let monitor = ProvisioningMonitor::init_with_config(&CONFIG.tracking);

    // Intento exitoso: provisioning -> launching -> operating -> completado
    let ok = ActivityId::with_sub_owner("demo-cloud", "small", "pending-1");
    monitor.on_provisioning_started(ok.clone());
    monitor.on_provisioning_completed(&ok, "agent-1");
    // (el nombre definitivo llega con la señal de éxito)

    // Intento que lanza y opera, y luego su recurso desaparece: lo barre el sweep
    let swept = ActivityId::with_sub_owner("demo-cloud", "small", "pending-2");
    monitor.on_provisioning_started(swept.clone());
    monitor.on_agent_launch_attempt(&swept);
    monitor.on_agent_online(&swept);
    monitor.sweep(|_| false);

    // Intento fallido: el diagnóstico Fail fuerza la completación
    let bad = ActivityId::with_sub_owner("demo-cloud", "large", "pending-3");
    monitor.on_provisioning_started(bad.clone());
    monitor.on_provisioning_failed(&bad, serde_json::json!({"error": "instance cap reached"}));

    // Reporte best-effort sobre un snapshot consistente
    println!("== activities ==");
    for activity in monitor.store().get_activities() {
        let partition = if activity.current_phase() == ProvisioningPhase::Completed {
            "archived"
        } else {
            "active"
        };
        println!("{:<10} {:<12} {:>9} {}",
                 activity.id().owner,
                 activity.name(),
                 partition,
                 activity.status());
    }

    println!("== health ==");
    let index = monitor.store().index();
    let mut owners: Vec<&str> = index.owners().collect();
    owners.sort_unstable();
    for owner in owners {
        let health = index.health_for_owner(owner);
        println!("{owner}: overall {} / current {}", health.overall(), health.current());
    }
}
