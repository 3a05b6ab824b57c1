//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Context;
use crate::{api, audit, store};
use gradtrack_core::{
    AllocationOptions, AllocationResult, DistributionOverview, GradTrackError, Snapshot, StudyType,
    TieBreak, results,
};

// =============================================================================
// ALLOCATE COMMAND
// =============================================================================

/// Run the allocation and print (optionally apply) the result.
pub fn cmd_allocate(
    ctx: &Context,
    cohort: Option<StudyType>,
    tie_break: Option<TieBreak>,
    apply: bool,
) -> Result<(), GradTrackError> {
    let mut snapshot = load(ctx)?;
    let options = ctx.config.allocation.options(cohort, tie_break);
    let result = snapshot.allocate(options)?;

    let applied = if apply {
        Some(apply_and_save(ctx, &mut snapshot, &options, &result)?)
    } else {
        audit::log_run(&options, &result, false);
        None
    };

    if ctx.json_mode {
        let output = serde_json::json!({
            "cohort": options.cohort,
            "tieBreak": options.tie_break,
            "applied": applied,
            "result": result,
        });
        print_json(&output)?;
        return Ok(());
    }

    println!("GradTrack Allocation");
    println!("====================");
    println!(
        "Cohort:     {}",
        options.cohort.map_or("all", |c| c.name())
    );
    println!("Tie-break:  {}", options.tie_break);
    println!();
    print_statistics(&result);
    if ctx.verbose {
        println!();
        print_assignments(&result);
    }
    println!();
    match applied {
        Some(updated) => println!(
            "Applied: {} teams updated in {:?}",
            updated, ctx.config.snapshot.path
        ),
        None => println!("Dry run. Re-run with --apply to write assignments."),
    }

    Ok(())
}

/// Write `result` into the snapshot file. The run is logged either way, so a
/// refused result still leaves its integrity event behind.
fn apply_and_save(
    ctx: &Context,
    snapshot: &mut Snapshot,
    options: &AllocationOptions,
    result: &AllocationResult,
) -> Result<usize, GradTrackError> {
    let outcome = snapshot
        .apply_result(result, store::now())
        .and_then(|count| {
            store::save_snapshot(snapshot, &ctx.config.snapshot.path).map(|()| count)
        });
    audit::log_run(options, result, outcome.is_ok());
    outcome
}

fn print_statistics(result: &AllocationResult) {
    let stats = &result.statistics;
    println!("Teams:      {}", stats.total_teams);
    println!("Assigned:   {}", stats.assigned_count);
    println!("Unassigned: {}", stats.unassigned_count);
    if !stats.duplicate_projects.is_empty() {
        println!("DUPLICATES: {:?}", stats.duplicate_projects);
    }
}

fn print_assignments(result: &AllocationResult) {
    println!("{:<24} {:<24} {:>6} {:>6}", "TEAM", "PROJECT", "GPA", "CHOICE");
    for a in &result.assignments {
        println!(
            "{:<24} {:<24} {:>6} {:>6}",
            a.team_id.as_str(),
            a.project_id.as_str(),
            a.max_gpa.to_string(),
            a.choice_rank
        );
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show distribution progress.
pub fn cmd_status(ctx: &Context) -> Result<(), GradTrackError> {
    let snapshot = load(ctx)?;
    let overview = DistributionOverview::from_snapshot(&snapshot);

    if ctx.json_mode {
        let output = serde_json::json!({
            "snapshot": ctx.config.snapshot.path.to_string_lossy(),
            "students": snapshot.students.len(),
            "projects": snapshot.projects.len(),
            "overview": overview,
        });
        print_json(&output)?;
        return Ok(());
    }

    println!("GradTrack Distribution Status");
    println!("=============================");
    println!("Snapshot: {:?}", ctx.config.snapshot.path);
    println!("Students: {}", snapshot.students.len());
    println!("Projects: {}", snapshot.projects.len());
    println!();
    println!("{:<10} {:>8} {:>16} {:>10}", "", "TEAMS", "WITH SELECTIONS", "ASSIGNED");
    for (label, counts) in [
        ("total", overview.total),
        ("morning", overview.morning),
        ("evening", overview.evening),
    ] {
        println!(
            "{:<10} {:>8} {:>16} {:>10}",
            label, counts.teams, counts.with_selections, counts.assigned
        );
    }

    Ok(())
}

// =============================================================================
// RESULTS COMMAND
// =============================================================================

/// List assigned teams of a cohort.
pub fn cmd_results(ctx: &Context, cohort: StudyType) -> Result<(), GradTrackError> {
    let snapshot = load(ctx)?;
    let rows = results(&snapshot, cohort);

    if ctx.json_mode {
        print_json(&serde_json::json!({ "cohort": cohort, "results": rows }))?;
        return Ok(());
    }

    if rows.is_empty() {
        println!("No assigned teams in the {} cohort", cohort);
        return Ok(());
    }

    println!("Results ({} cohort, {} teams):", cohort, rows.len());
    for row in &rows {
        let rank = row
            .choice_rank
            .map_or_else(|| "-".to_string(), |r| r.to_string());
        println!(
            "  {} -> {} [{}] supervisor: {} choice: {}",
            row.team_name,
            row.project_title.as_deref().unwrap_or("(untitled)"),
            row.project_id,
            row.supervisor_id.as_deref().unwrap_or("-"),
            rank
        );
    }

    Ok(())
}

// =============================================================================
// RESET COMMANDS
// =============================================================================

/// Clear assignments, optionally for one cohort only.
pub fn cmd_reset(ctx: &Context, cohort: Option<StudyType>) -> Result<(), GradTrackError> {
    let mut snapshot = load(ctx)?;
    let cleared = snapshot.reset_assignments(cohort);
    store::save_snapshot(&snapshot, &ctx.config.snapshot.path)?;

    let scope = cohort.map_or("all", |c| c.name());
    tracing::info!(event = "reset_assignments", cohort = scope, cleared, "Assignments reset");
    report_count(ctx, "cleared", cleared, &format!("Cleared {} assignments ({})", cleared, scope))
}

/// Clear project selections of one cohort.
pub fn cmd_reset_selections(ctx: &Context, cohort: StudyType) -> Result<(), GradTrackError> {
    let mut snapshot = load(ctx)?;
    let cleared = snapshot.reset_selections(cohort);
    store::save_snapshot(&snapshot, &ctx.config.snapshot.path)?;

    tracing::info!(
        event = "reset_selections",
        cohort = cohort.name(),
        cleared,
        "Selections reset"
    );
    report_count(
        ctx,
        "cleared",
        cleared,
        &format!("Cleared selections of {} {} teams", cleared, cohort),
    )
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    mut ctx: Context,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), GradTrackError> {
    if let Some(host) = host {
        ctx.config.server.host = host;
    }
    if let Some(port) = port {
        ctx.config.server.port = port;
    }
    let snapshot = load(&ctx)?;
    let server = &ctx.config.server;

    println!("GradTrack Allocation Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", server.host);
    println!("  Port:     {}", server.port);
    println!("  Snapshot: {:?}", ctx.config.snapshot.path);
    println!();
    println!("Endpoints:");
    println!("  GET  /health           - Health check");
    println!("  GET  /status           - Distribution progress");
    println!("  GET  /results          - Assigned teams of a cohort");
    println!("  POST /allocate         - Run (and optionally apply) allocation");
    println!("  POST /allocate/preview - Allocate a posted snapshot");
    println!("  POST /reset            - Clear assignments");
    println!("  POST /selections/reset - Clear selections of a cohort");
    println!("  PUT  /snapshot         - Replace the snapshot");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", server.host, server.port);
    let path = ctx.config.snapshot.path.clone();
    let state = api::AppState::with_store(snapshot, Some(path), ctx.config);
    api::run_server(&addr, state).await
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn load(ctx: &Context) -> Result<Snapshot, GradTrackError> {
    store::load_snapshot(&ctx.config.snapshot.path, ctx.config.snapshot.max_size_bytes)
}

fn print_json(value: &serde_json::Value) -> Result<(), GradTrackError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| GradTrackError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn report_count(
    ctx: &Context,
    key: &str,
    count: usize,
    message: &str,
) -> Result<(), GradTrackError> {
    if ctx.json_mode {
        let mut output = serde_json::Map::new();
        output.insert(key.to_string(), serde_json::Value::from(count));
        return print_json(&serde_json::Value::Object(output));
    }
    println!("{}", message);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use gradtrack_core::{Assignment, Gpa, ProjectId, Student, Team, TeamId};
    use std::io;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    fn context(path: &Path) -> Context {
        let mut config = AppConfig::default();
        config.snapshot.path = path.to_path_buf();
        Context {
            config,
            json_mode: true,
            verbose: false,
        }
    }

    fn seed(path: &Path) {
        let mut night = Team::new("t2", ["P1", "P2"]).with_members(["s2"]);
        night.study_type = Some("evening".to_string());
        let snapshot = Snapshot::new(
            vec![Team::new("t1", ["P1"]).with_members(["s1"]), night],
            vec![Student::new("s1", 3.0), Student::new("s2", 3.8)],
        );
        store::save_snapshot(&snapshot, path).expect("seed");
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradtrack.json");
        seed(&path);
        let before = std::fs::read(&path).expect("read");

        cmd_allocate(&context(&path), None, None, false).expect("allocate");

        assert_eq!(std::fs::read(&path).expect("read"), before);
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            BufferWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn refused_apply_still_logs_integrity_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradtrack.json");
        seed(&path);
        let before = std::fs::read(&path).expect("read");
        let ctx = context(&path);
        let mut snapshot = load(&ctx).expect("load");

        let twice = |team: &str| Assignment {
            team_id: TeamId::from(team),
            project_id: ProjectId::from("P1"),
            max_gpa: Gpa::new(3.0),
            choice_rank: 1,
        };
        let result = AllocationResult::new(vec![twice("t1"), twice("t2")], 2);

        let sink = SharedBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .json()
            .with_max_level(Level::INFO)
            .finish();
        let outcome = tracing::subscriber::with_default(subscriber, || {
            apply_and_save(&ctx, &mut snapshot, &AllocationOptions::default(), &result)
        });

        assert!(matches!(outcome, Err(GradTrackError::DuplicateProjects(_))));
        assert_eq!(std::fs::read(&path).expect("read"), before);

        let text = String::from_utf8(sink.0.lock().expect("log buffer").clone()).expect("utf8");
        let events: Vec<serde_json::Value> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("json log line"))
            .collect();
        let integrity = events
            .iter()
            .find(|e| e["fields"]["event"] == "allocation_integrity")
            .expect("integrity event");
        assert_eq!(integrity["level"], "ERROR");
        assert!(
            events
                .iter()
                .any(|e| e["fields"]["event"] == "allocation_run" && e["fields"]["applied"] == false)
        );
    }

    #[test]
    fn apply_persists_assignments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradtrack.json");
        seed(&path);

        cmd_allocate(&context(&path), None, None, true).expect("allocate");

        let saved = store::load_snapshot(&path, 1024 * 1024).expect("load");
        assert_eq!(saved.teams[1].assigned_project_id.as_ref().map(|p| p.as_str()), Some("P1"));
        assert_eq!(saved.teams[1].assigned_choice_rank, Some(1));
        assert!(saved.teams[0].assigned_project_id.is_none());
        assert!(saved.teams[0].assigned_date.is_none());
    }

    #[test]
    fn cohort_run_then_reset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradtrack.json");
        seed(&path);
        let ctx = context(&path);

        cmd_allocate(&ctx, Some(StudyType::Morning), None, true).expect("allocate");
        let saved = store::load_snapshot(&path, 1024 * 1024).expect("load");
        assert_eq!(saved.teams[0].assigned_choice_rank, Some(1));
        assert!(saved.teams[1].assigned_project_id.is_none());

        cmd_reset(&ctx, Some(StudyType::Morning)).expect("reset");
        cmd_reset_selections(&ctx, StudyType::Evening).expect("reset selections");
        let saved = store::load_snapshot(&path, 1024 * 1024).expect("load");
        assert!(!saved.teams.iter().any(|t| t.is_assigned()));
        assert!(!saved.teams[1].has_selections());
        assert!(saved.teams[0].has_selections());
    }

    #[test]
    fn status_and_results_on_missing_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir.path().join("absent.json"));

        cmd_status(&ctx).expect("status");
        cmd_results(&ctx, StudyType::Morning).expect("results");
    }
}
