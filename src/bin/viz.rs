use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use tvc_attitude::dynamics::VehicleBody;
use tvc_attitude::gnc::TvcMount;
use tvc_attitude::sim::{ControlLoop, LoopHandle, TimeClock, TimeSource};
use tvc_attitude::vehicle::{presets, Scenario};
use tvc_attitude::TvcResult;

const REFRESH: Duration = Duration::from_millis(50);

fn main() -> eframe::Result {
    tracing_subscriber::fmt::init();

    let app = LoopViz::new(presets::visualization());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native("TVC Attitude Loop", options, Box::new(|_| Ok(Box::new(app))))
}

/// A loop running on its own thread plus the handles the UI reads from.
struct Run {
    clock: Arc<TimeClock>,
    mount: Arc<TvcMount>,
    body: Arc<VehicleBody>,
    handle: LoopHandle,
}

impl Run {
    fn start(scenario: &Scenario) -> TvcResult<Self> {
        let clock = Arc::new(TimeClock::new());
        let control = ControlLoop::from_scenario(scenario, clock.clone())?;
        let mount = control.mount();
        let body = control.body();
        clock.start()?;
        Ok(Self { clock, mount, body, handle: control.spawn() })
    }
}

struct LoopViz {
    scenario: Scenario,
    run: Option<Run>,
    rocket: Vec<[f64; 2]>,
    mount: Vec<[f64; 2]>,
    status: String,
}

impl LoopViz {
    fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            run: None,
            rocket: Vec::new(),
            mount: Vec::new(),
            status: "Stopped".into(),
        }
    }

    fn toggle(&mut self) {
        match self.run.take() {
            Some(run) => {
                self.status = match run.handle.stop() {
                    Ok(n) => format!("Stopped after {} iterations", n),
                    Err(e) => format!("Loop failed: {e}"),
                };
            }
            None => {
                self.rocket.clear();
                self.mount.clear();
                match Run::start(&self.scenario) {
                    Ok(run) => {
                        self.run = Some(run);
                        self.status = "Running".into();
                    }
                    Err(e) => self.status = format!("Could not start: {e}"),
                }
            }
        }
    }

    fn sample(&mut self) {
        if let Some(run) = &self.run {
            let t = run.clock.time().as_secs_f64();
            self.rocket.push([t, run.body.angle()]);
            self.mount.push([t, run.mount.angle()]);
        }
    }
}

impl eframe::App for LoopViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sample();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("Scenario: {}", self.scenario.name));
                let label = if self.run.is_some() { "Stop" } else { "Start" };
                if ui.button(label).clicked() {
                    self.toggle();
                }
            });
            let latest = |series: &[[f64; 2]]| series.last().map_or(0.0, |p| p[1]);
            ui.label(format!(
                "{}  |  Rocket: {:+.2} deg  |  Mount: {:+.1} deg  |  Setpoint: {:+.1} deg",
                self.status,
                latest(&self.rocket),
                latest(&self.mount),
                self.scenario.control.setpoint,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let rocket: PlotPoints = self.rocket.iter().copied().collect();
            let mount: PlotPoints = self.mount.iter().copied().collect();
            Plot::new("attitude")
                .legend(Legend::default())
                .x_axis_label("Time (s)")
                .y_axis_label("Angle (deg)")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Rocket", rocket));
                    plot_ui.line(Line::new("Mount", mount));
                });
        });

        if self.run.is_some() {
            ctx.request_repaint_after(REFRESH);
        }
    }
}
