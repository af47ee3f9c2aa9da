//! Closed-loop control of a simulated first-order process.
//!
//! Demonstrated here:
//!   * Building a controller from a stored tuning
//!   * Stepping time with a manual clock instead of sleeping
//!   * Flushing at a fixed pressure, then resuming without a jump in the output
//!   * Logging to the terminal and to a file

use pidflow::logging::{default_op_name, init_logging, log_tuning};
use pidflow::{Controller, ManualClock, PidConfig};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let op_dir = std::env::temp_dir().join("pidflow");
    let op_name = format!("first_order_{}", default_op_name());
    let (log_path, _guards) = init_logging(&op_dir, &op_name, "debug")?;
    info!("Logging to {log_path:?}");

    // Tuning is usually stored next to the operation
    let cfg: PidConfig = serde_json::from_str(r#"{"kp": 1.2, "ki": 1.0, "kd": 0.001}"#)?;
    log_tuning(&op_name, &cfg);

    let dt = 0.01;
    let tau = 0.5;
    let mut y = 0.0;

    let mut pid = Controller::from_config(cfg, ManualClock::default());
    pid.set_target(1.0);

    let step = |pid: &mut Controller<ManualClock>, y: &mut f64| {
        pid.clock().advance(dt);
        let u = pid.update(*y);
        *y += dt * (u - *y) / tau;
        u
    };

    let mut u = 0.0;
    for i in 0..1000 {
        u = step(&mut pid, &mut y);
        if i % 100 == 0 {
            info!("t = {:.2}s  u = {u:.4}  y = {y:.4}", pid.current_time());
        }
    }

    info!("Flushing at zero pressure");
    let held = u;
    pid.start_flush(0.0);
    for _ in 0..100 {
        step(&mut pid, &mut y);
    }
    info!("After flush y = {y:.4}");

    pid.resume_flow(1.0, cfg.ki, held)?;
    for i in 0..1000 {
        u = step(&mut pid, &mut y);
        if i % 100 == 0 {
            info!("t = {:.2}s  u = {u:.4}  y = {y:.4}", pid.current_time());
        }
    }

    info!("Final state: {}", serde_json::to_string(&pid.state())?);

    Ok(())
}
