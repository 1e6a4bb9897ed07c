use clap::{Args, Parser, Subcommand};
use hero_core::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hero")]
#[command(about = "Chaos exercise planner - your micro-heroic workout!", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the standard one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Exercise catalog (YAML), overrides the configured catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
struct PlanArgs {
    /// Number of exercises to plan in the session
    #[arg(short = 'n', long)]
    num_exercises: Option<usize>,

    /// Where you want to train (indoor, outdoor, any)
    #[arg(short, long)]
    location: Option<Location>,

    /// Intensity level of the workout (easy, medium, heroic)
    #[arg(short, long)]
    intensity: Option<Intensity>,

    /// Seed for a reproducible plan
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a session and walk through it (default)
    Run {
        #[command(flatten)]
        plan: PlanArgs,

        /// Run fully headless: no keyboard prompts, automatic prep
        #[arg(short = 'H', long)]
        headless: bool,

        /// Skip every wait (for testing)
        #[arg(long)]
        instant: bool,
    },

    /// Show a plan without running it
    Plan {
        #[command(flatten)]
        plan: PlanArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the exercises in the catalog
    Catalog,
}

fn main() -> Result<()> {
    // Initialize logging
    hero_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let catalog = config.load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Some(Commands::Run {
            plan,
            headless,
            instant,
        }) => cmd_run(&config, &catalog, &plan, headless, instant),
        Some(Commands::Plan { plan, json }) => cmd_plan(&config, &catalog, &plan, json),
        Some(Commands::Catalog) => cmd_catalog(&catalog),
        None => {
            // Default to "run" command
            cmd_run(&config, &catalog, &PlanArgs::default(), false, false)
        }
    }
}

fn build_plan(config: &Config, catalog: &Catalog, args: &PlanArgs) -> Result<Vec<PlannedExercise>> {
    let num_exercises = args.num_exercises.unwrap_or(config.workout.num_exercises);
    let intensity = args.intensity.unwrap_or(config.workout.intensity);
    let location = args.location.unwrap_or(config.workout.location);

    tracing::info!("num_exercises: {}", num_exercises);
    tracing::info!("intensity: {}", intensity);
    tracing::info!("location: {}", location);

    let mut planner = match args.seed {
        Some(seed) => Planner::seeded(catalog.templates(), intensity, location, seed)?,
        None => Planner::new(catalog.templates(), intensity, location)?,
    };
    let plan = planner.plan(num_exercises)?;

    if plan.len() < num_exercises {
        tracing::warn!(
            "Only {} of {} exercises could be planned with the current filters",
            plan.len(),
            num_exercises
        );
    }

    Ok(plan)
}

fn cmd_run(
    config: &Config,
    catalog: &Catalog,
    args: &PlanArgs,
    headless: bool,
    instant: bool,
) -> Result<()> {
    let plan = build_plan(config, catalog, args)?;
    display_plan(&plan);

    let narrator = narrator_from_config(&config.speech)?;
    let music = PlaylistPlayer::from_config(&config.music)?;
    let settings = SessionSettings::from_config(&config.session, headless);

    let report = if instant {
        SessionRunner::new(narrator, music, InstantPacer, settings).run(&plan)?
    } else {
        let pacer = RealPacer::with_interrupt(install_skip_handler()?);
        SessionRunner::new(narrator, music, pacer, settings).run(&plan)?
    };

    println!(
        "\n✓ Session complete: {} exercises, {} seconds of work",
        report.exercises, report.total_work_seconds
    );
    Ok(())
}

/// Ctrl-C skips the current exercise; a second one before it is handled quits
fn install_skip_handler() -> Result<Arc<AtomicBool>> {
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .map_err(|e| Error::Config(format!("Unable to install Ctrl-C handler: {}", e)))?;
    Ok(interrupt)
}

fn cmd_plan(config: &Config, catalog: &Catalog, args: &PlanArgs, json: bool) -> Result<()> {
    let plan = build_plan(config, catalog, args)?;

    if json {
        let output = serde_json::json!({
            "exercises": plan,
            "props": props_by_location(&plan),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        display_plan(&plan);
    }
    Ok(())
}

fn cmd_catalog(catalog: &Catalog) -> Result<()> {
    for (category, templates) in catalog.by_category() {
        println!("{} ({} exercises)", category, templates.len());
        for template in templates {
            let props = if template.props.is_empty() {
                String::new()
            } else {
                format!(", props: {}", template.props.join(", "))
            };
            println!(
                "  - {} [{}] max reps {}{}",
                template.name, template.location, template.max_reps, props
            );
        }
    }
    Ok(())
}

fn display_plan(plan: &[PlannedExercise]) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  HERO WORKOUT: {} EXERCISES", plan.len());
    println!("╰─────────────────────────────────────────╯");
    println!();
    for line in format_plan(plan) {
        println!("  {}", line);
    }
    println!();
}
