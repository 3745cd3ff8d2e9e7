//! Human-readable output.

use std::fmt::Write;

use tf_optimizer::SearchReport;
use tf_timing::TimingProfile;
use tf_types::{format_si, Components, Target};

pub fn report_text(report: &SearchReport, target: &Target) -> String {
    let mut out = String::new();
    let coverage = if report.exhaustive {
        "exhaustive".to_string()
    } else {
        format!("sampled {} of {}", report.evaluations, report.space_size)
    };
    let _ = writeln!(
        out,
        "Strategy: {} ({} evaluations, {})",
        report.strategy, report.evaluations, coverage
    );
    let _ = writeln!(out, "Target: {target}");
    let _ = writeln!(out, "{}", report.solution);

    if let Ok(profile) = report.solution.profile() {
        let _ = writeln!(
            out,
            "Frequency: {}  Duty: {:.1}%",
            format_si(profile.frequency, "Hz"),
            profile.duty * 100.0
        );
    }
    if report.refined {
        let _ = writeln!(
            out,
            "Refined from grid error {:.3e} (gain {:.3e})",
            report.sweep_error,
            report.refinement_gain()
        );
    }
    let elapsed = report.elapsed().num_microseconds().unwrap_or(0) as f64 * 1e-6;
    let _ = write!(out, "Elapsed: {}", format_si(elapsed, "s"));
    out
}

pub fn profile_text(components: &Components, profile: &TimingProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "R1: {}", format_si(components.r1, "Ω"));
    let _ = writeln!(out, "R2: {}", format_si(components.r2, "Ω"));
    let _ = writeln!(out, "C:  {}", format_si(components.c, "F"));
    let _ = writeln!(out, "Frequency: {}", format_si(profile.frequency, "Hz"));
    let _ = writeln!(out, "Period:    {}", format_si(profile.period, "s"));
    let _ = writeln!(out, "Time high: {}", format_si(profile.time_high, "s"));
    let _ = writeln!(out, "Time low:  {}", format_si(profile.time_low, "s"));
    let _ = write!(out, "Duty:      {:.1}%", profile.duty * 100.0);
    out
}
