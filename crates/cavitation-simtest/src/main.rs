//! Cavitation Headless Dive Harness
//!
//! Validates ballast controller logic and part data without a game host.
//! Runs entirely in-process against a toy hull model: no engine, no
//! rendering.
//!
//! Usage:
//!   cargo run -p cavitation-simtest
//!   cargo run -p cavitation-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p cavitation-simtest

use cavitation_logic::ballast::{fill_percent, BallastStatus, BallastUnit, ControlMode, TickInput};
use cavitation_logic::config::{validate_config, BallastConfig, FillEnergyPolicy};
use cavitation_logic::gate::EnergyPool;
use cavitation_logic::rate::{smallest_variant_mass, VariantContext};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

// ── Part catalogue ──────────────────────────────────────────────────────
const PARTS_JSON: &str = include_str!("../../../data/ballast_parts.json");

#[derive(Debug, Deserialize)]
struct PartSpec {
    name: String,
    starting_buoyancy: f32,
    variant_masses: Vec<f32>,
    config: BallastConfig,
}

impl PartSpec {
    fn build(&self) -> Option<BallastUnit> {
        let base_mass = smallest_variant_mass(&self.variant_masses)?;
        BallastUnit::new(self.config.clone(), self.starting_buoyancy, base_mass).ok()
    }
}

// ── Toy host ────────────────────────────────────────────────────────────

/// Physics step, seconds.
const DT: f32 = 0.02;
/// Terminal speed (m/s) at either end of the buoyancy range.
const HULL_SPAN_SPEED: f32 = 15.0;
/// Linear drag, 1/s.
const HULL_DRAG: f32 = 2.0;

/// One-dimensional hull: buoyancy above the range midpoint pushes it up.
struct ToyHull {
    altitude: f32,
    vertical_speed: f32,
    neutral: f32,
    gain: f32,
}

impl ToyHull {
    fn at_surface(config: &BallastConfig) -> Self {
        let half_range = (config.max_buoyancy - config.min_buoyancy) / 2.0;
        Self {
            altitude: 0.0,
            vertical_speed: 0.0,
            neutral: config.min_buoyancy + half_range,
            gain: HULL_DRAG * HULL_SPAN_SPEED / half_range.max(f32::EPSILON),
        }
    }

    fn input(&self) -> TickInput {
        TickInput {
            dt: DT,
            splashed: self.altitude <= 0.0,
            vertical_speed: self.vertical_speed,
            altitude: self.altitude,
        }
    }

    fn step(&mut self, buoyancy: f32) {
        let accel = (buoyancy - self.neutral) * self.gain - HULL_DRAG * self.vertical_speed;
        self.vertical_speed += accel * DT;
        self.altitude += self.vertical_speed * DT;
        // Floats at the waterline
        if self.altitude > 0.0 {
            self.altitude = 0.0;
            self.vertical_speed = self.vertical_speed.min(0.0);
        }
    }

    fn depth(&self) -> f32 {
        -self.altitude
    }
}

/// Vessel electrical bus with a battery and a fixed generator output.
struct VesselBus {
    charge: f32,
    capacity: f32,
    generation: f32,
    shortfalls: u32,
}

impl VesselBus {
    fn recharge(&mut self, dt: f32) {
        self.charge = (self.charge + self.generation * dt).min(self.capacity);
    }
}

impl EnergyPool for VesselBus {
    fn request_energy(&mut self, amount: f32) -> f32 {
        let granted = amount.min(self.charge).max(0.0);
        if granted < amount {
            self.shortfalls += 1;
        }
        self.charge -= granted;
        granted
    }
}

fn unlimited(amount: f32) -> f32 {
    amount
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Cavitation Dive Harness ===\n");

    let mut results = Vec::new();

    let parts: Vec<PartSpec> = match serde_json::from_str(PARTS_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "parts_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 1. Part catalogue validation
    record(&mut results, "catalogue", validate_part_catalogue(&parts, verbose));

    // 2. Dive to depth and return to surface
    record(&mut results, "dive", validate_dive_profiles(&parts, verbose));

    // 3. Fill mode on a static hull
    record(&mut results, "fill", validate_fill_mode(&parts, verbose));

    // 4. Variant rescaling
    record(&mut results, "variants", validate_variants(&parts, verbose));

    // 5. Shared bus contention
    record(&mut results, "bus", validate_shared_bus(&parts, verbose));

    // 6. Randomized invariant sweep
    record(&mut results, "sweep", validate_invariant_sweep(&parts, verbose));

    if report(&results, verbose) > 0 {
        std::process::exit(1);
    }
}

/// One-line pass count for a harness section.
fn section_summary(section: &str, batch: &[TestResult]) -> String {
    let passed = batch.iter().filter(|r| r.passed).count();
    format!("{}: {}/{} checks passed", section, passed, batch.len())
}

fn record(results: &mut Vec<TestResult>, section: &str, batch: Vec<TestResult>) {
    let summary = section_summary(section, &batch);
    if batch.iter().all(|r| r.passed) {
        log::info!("{}", summary);
    } else {
        log::warn!("{}", summary);
    }
    results.extend(batch);
}

fn report(results: &[TestResult], verbose: bool) -> usize {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed
}

// ── 1. Part Catalogue ───────────────────────────────────────────────────

fn validate_part_catalogue(parts: &[PartSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Part Catalogue ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "catalogue_not_empty".into(),
        passed: !parts.is_empty(),
        detail: format!("{} parts", parts.len()),
    });

    for part in parts {
        let errors = validate_config(&part.config);
        results.push(TestResult {
            name: format!("config_valid[{}]", part.name),
            passed: errors.is_empty(),
            detail: if errors.is_empty() {
                "ok".into()
            } else {
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            },
        });

        let unit = part.build();
        results.push(TestResult {
            name: format!("unit_builds[{}]", part.name),
            passed: unit.is_some(),
            detail: format!("variants={:?}", part.variant_masses),
        });

        if verbose {
            println!("  {}:\n    {}", part.name, part.config.info().replace('\n', "\n    "));
        }
    }

    results
}

// ── 2. Dive Profiles ────────────────────────────────────────────────────

/// Simulated seconds allowed for each leg of the dive.
const LEG_SECONDS: f32 = 1200.0;
const DIVE_TOLERANCE_M: f32 = 15.0;

fn run_leg(unit: &mut BallastUnit, hull: &mut ToyHull) -> f32 {
    let ticks = (LEG_SECONDS / DT) as usize;
    let mut peak_speed: f32 = 0.0;
    for _ in 0..ticks {
        let report = unit.tick(&hull.input(), &mut unlimited);
        hull.step(report.buoyancy);
        peak_speed = peak_speed.max(hull.vertical_speed.abs());
    }
    peak_speed
}

fn validate_dive_profiles(parts: &[PartSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Dive Profiles ---");
    let mut results = Vec::new();

    for part in parts {
        let Some(mut unit) = part.build() else {
            continue;
        };
        let mut hull = ToyHull::at_surface(&part.config);
        let target = part.config.max_depth.min(100.0);

        unit.set_pump_active(true);
        unit.set_target_depth(target);
        let peak = run_leg(&mut unit, &mut hull);
        let miss = (hull.depth() - target).abs();
        if verbose {
            println!(
                "  {} dive: depth={:.1}m target={}m peak={:.2}m/s status={}",
                part.name,
                hull.depth(),
                target,
                peak,
                unit.status()
            );
        }
        results.push(TestResult {
            name: format!("dive_reaches_target[{}]", part.name),
            passed: miss < DIVE_TOLERANCE_M,
            detail: format!("depth {:.1}m vs target {}m", hull.depth(), target),
        });

        unit.set_target_depth(0.0);
        run_leg(&mut unit, &mut hull);
        let max_b = part.config.max_buoyancy;
        results.push(TestResult {
            name: format!("surfaces_and_flushes[{}]", part.name),
            passed: hull.depth() < 1.0 && unit.buoyancy() >= max_b,
            detail: format!(
                "depth {:.2}m, buoyancy {:.3}/{}",
                hull.depth(),
                unit.buoyancy(),
                max_b
            ),
        });

        // Lift the part out of the water
        hull.altitude = 5.0;
        let report = unit.tick(&hull.input(), &mut unlimited);
        results.push(TestResult {
            name: format!("above_waterline[{}]", part.name),
            passed: report.status == BallastStatus::AboveWaterline && report.current_depth == 0,
            detail: format!("status={}", report.status),
        });
    }

    results
}

// ── 3. Fill Mode ────────────────────────────────────────────────────────

fn validate_fill_mode(parts: &[PartSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Fill Mode ---");
    let mut results = Vec::new();

    for part in parts {
        let Some(mut unit) = part.build() else {
            continue;
        };
        unit.toggle();
        unit.set_pump_active(true);
        unit.set_target_fill(50.0);

        // Held at a fixed depth, as if clamped to a launch rig
        let input = TickInput {
            dt: DT,
            splashed: true,
            vertical_speed: 0.0,
            altitude: -20.0,
        };
        let mut ticks = 0;
        while unit.status() != BallastStatus::Idle || ticks == 0 {
            unit.tick(&input, &mut unlimited);
            ticks += 1;
            if ticks > 100_000 {
                break;
            }
        }
        if verbose {
            println!(
                "  {}: fill {}% after {:.1}s",
                part.name,
                unit.fill_percent(),
                ticks as f32 * DT
            );
        }
        results.push(TestResult {
            name: format!("fill_settles[{}]", part.name),
            passed: (unit.fill_percent() - 50).abs() <= 1,
            detail: format!("fill {}% after {} ticks", unit.fill_percent(), ticks),
        });

        let mut drained = VesselBus {
            charge: 0.0,
            capacity: 0.0,
            generation: 0.0,
            shortfalls: 0,
        };
        unit.set_target_fill(0.0);
        let before = unit.buoyancy();
        let report = unit.tick(&input, &mut drained);
        let expect_moved = part.config.fill_energy_policy == FillEnergyPolicy::Ungated;
        results.push(TestResult {
            name: format!("fill_energy_policy[{}]", part.name),
            passed: (report.buoyancy != before) == expect_moved,
            detail: format!(
                "{:?}: status={} moved={}",
                part.config.fill_energy_policy,
                report.status,
                report.buoyancy != before
            ),
        });
    }

    results
}

// ── 4. Variants ─────────────────────────────────────────────────────────

fn validate_variants(parts: &[PartSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Variants ---");
    let mut results = Vec::new();

    for part in parts {
        let Some(mut unit) = part.build() else {
            continue;
        };
        let mut masses = part.variant_masses.clone();
        masses.sort_by(|a, b| a.total_cmp(b));

        let rates: Vec<f32> = masses
            .iter()
            .map(|m| unit.on_variant_mass_changed(*m, VariantContext::Editor))
            .collect();
        if verbose {
            println!("  {}: masses={:?} rates={:?}", part.name, masses, rates);
        }
        results.push(TestResult {
            name: format!("heavier_pumps_slower[{}]", part.name),
            passed: rates.windows(2).all(|w| w[1] <= w[0]),
            detail: format!("{:?}", rates),
        });

        // Lightest variant pumps at half the base rate
        let lightest = rates.first().copied().unwrap_or(0.0);
        results.push(TestResult {
            name: format!("lightest_half_rate[{}]", part.name),
            passed: (lightest - part.config.pump_rate / 2.0).abs() < 1e-4,
            detail: format!("{} vs base {}", lightest, part.config.pump_rate),
        });

        let mut flight = part.build();
        let agreed = flight.as_mut().map(|f| {
            let last = *masses.last().unwrap_or(&0.0);
            f.on_variant_mass_changed(last, VariantContext::Flight)
                == *rates.last().unwrap_or(&0.0)
        });
        results.push(TestResult {
            name: format!("editor_flight_agree[{}]", part.name),
            passed: agreed == Some(true),
            detail: "same mass, same rate".into(),
        });
    }

    results
}

// ── 5. Shared Bus ───────────────────────────────────────────────────────

fn validate_shared_bus(parts: &[PartSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Shared Bus ---");
    let mut results = Vec::new();

    let Some(part) = parts.first() else {
        return results;
    };
    let mut units: Vec<BallastUnit> = (0..4).filter_map(|_| part.build()).collect();
    for unit in &mut units {
        unit.set_pump_active(true);
        unit.set_target_depth(part.config.max_depth);
    }

    // Generator covers two pumps out of four
    let demand = part.config.ec_requirement;
    let mut bus = VesselBus {
        charge: 0.0,
        capacity: demand * 10.0,
        generation: demand * 2.0,
        shortfalls: 0,
    };

    let input = TickInput {
        dt: DT,
        splashed: true,
        vertical_speed: 0.0,
        altitude: -50.0,
    };
    let mut starved = 0;
    let mut negative_charge = false;
    for _ in 0..5_000 {
        bus.recharge(DT);
        for unit in &mut units {
            if unit.tick(&input, &mut bus).status == BallastStatus::InsufficientEnergy {
                starved += 1;
            }
        }
        negative_charge |= bus.charge < 0.0;
    }

    if verbose {
        println!(
            "  {} pumps: {} starved ticks, {} shortfalls",
            units.len(),
            starved,
            bus.shortfalls
        );
    }
    results.push(TestResult {
        name: "bus_contention_starves_some".into(),
        passed: starved > 0 && starved < 4 * 5_000,
        detail: format!("{} starved of {}", starved, 4 * 5_000),
    });
    results.push(TestResult {
        name: "bus_never_negative".into(),
        passed: !negative_charge,
        detail: format!("final charge {:.3}", bus.charge),
    });

    results
}

// ── 6. Invariant Sweep ──────────────────────────────────────────────────

const SWEEP_SEED: u64 = 0x0C_A71_7A7E;
const SWEEP_TICKS: usize = 20_000;

fn validate_invariant_sweep(parts: &[PartSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Invariant Sweep ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SWEEP_SEED);

    for part in parts {
        let Some(mut unit) = part.build() else {
            continue;
        };
        let config = part.config.clone();
        let mut range_violations = 0;
        let mut fill_violations = 0;
        let mut toggles = 0;

        for _ in 0..SWEEP_TICKS {
            match rng.gen_range(0..100) {
                0 => {
                    unit.toggle();
                    toggles += 1;
                }
                1 => unit.toggle_pump(),
                2 => unit.set_target_depth(rng.gen_range(-100.0..config.max_depth + 100.0)),
                3 => unit.set_target_fill(rng.gen_range(-20.0..120.0)),
                4 => {
                    let mass = rng.gen_range(0.0..10.0);
                    unit.on_variant_mass_changed(mass, VariantContext::Flight);
                }
                _ => {}
            }

            let input = TickInput {
                dt: rng.gen_range(0.0..0.5),
                splashed: rng.gen_bool(0.9),
                vertical_speed: rng.gen_range(-5.0..5.0),
                altitude: rng.gen_range(-config.max_depth..20.0),
            };
            let grant_fraction: f32 = rng.gen_range(0.8..1.0);
            let report = unit.tick(&input, &mut |a: f32| a * grant_fraction);

            if report.buoyancy < config.min_buoyancy || report.buoyancy > config.max_buoyancy {
                range_violations += 1;
            }
            let expected_fill = fill_percent(report.buoyancy, config.max_buoyancy);
            if report.actuated && report.fill_percent != expected_fill {
                fill_violations += 1;
            }
        }

        if verbose {
            println!(
                "  {}: {} ticks, {} mode toggles, final mode {:?}",
                part.name,
                SWEEP_TICKS,
                toggles,
                unit.mode()
            );
        }
        results.push(TestResult {
            name: format!("buoyancy_in_range[{}]", part.name),
            passed: range_violations == 0,
            detail: format!("{} violations", range_violations),
        });
        results.push(TestResult {
            name: format!("fill_matches_buoyancy[{}]", part.name),
            passed: fill_violations == 0,
            detail: format!("{} violations", fill_violations),
        });

        let settings = unit.settings();
        unit.toggle();
        unit.toggle();
        results.push(TestResult {
            name: format!("toggle_twice_identity[{}]", part.name),
            passed: unit.settings() == settings
                && matches!(settings.mode, ControlMode::TargetDepth | ControlMode::TargetFill),
            detail: format!("{:?}", settings.mode),
        });
    }

    results
}
