use clap::Parser;
use gradesheet::domain::grading::grading_chart;
use gradesheet::domain::model::CgpaMode;
use gradesheet::utils::error::ErrorSeverity;
use gradesheet::utils::{logger, validation::Validate};
use gradesheet::{
    CalculationKind, CliConfig, GradeEngine, GradePolicy, JsonFileStore, PolicyConfig, Result,
    Transcript,
};
use std::path::Path;

fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting gradesheet CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config) {
        tracing::error!(
            "gradesheet failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn load_policy(config: &CliConfig) -> Result<GradePolicy> {
    match &config.policy {
        Some(path) => {
            tracing::info!("Loading grading policy from {}", path);
            PolicyConfig::from_file(path)?.into_policy()
        }
        None => Ok(GradePolicy::default()),
    }
}

fn print_chart() {
    println!("{:<6} {:>7} {:>12}", "Grade", "Marks", "Grade Point");
    for band in grading_chart() {
        println!(
            "{:<6} {:>7} {:>12}",
            band.letter.as_str(),
            format!("{}-{}", band.min_marks, band.max_marks),
            band.gp_range
        );
    }
    println!();
}

fn cell(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_sgpa(engine: &GradeEngine<JsonFileStore>) {
    for (i, subject) in engine.sgpa().subjects().iter().enumerate() {
        let name = if subject.name().is_empty() {
            "Untitled Subject"
        } else {
            subject.name()
        };
        println!(
            "{:>2}. {:<24} {:<9} {:>3} cr {:>4} marks  {:.2} {}",
            i + 1,
            name,
            subject.code(),
            cell(subject.credits()),
            cell(subject.marks()),
            subject.grade_point(),
            subject.grade_letter()
        );
    }
}

fn print_cgpa(engine: &GradeEngine<JsonFileStore>) {
    let cgpa = engine.cgpa();
    println!("Mode: {:?}", cgpa.mode());
    for semester in cgpa.semesters() {
        let sgpa = semester
            .sgpa()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} SGPA {:>5} {:>3} cr  {}",
            semester.name(),
            sgpa,
            cell(semester.credits()),
            semester.grade_letter()
        );
        if cgpa.mode() == CgpaMode::Expert {
            for subject in semester.subjects() {
                println!(
                    "    {:<24} {:>3} cr {:>4} marks  {:.2} {}",
                    subject.name(),
                    cell(subject.credits()),
                    cell(subject.marks()),
                    subject.grade_point(),
                    subject.grade_letter()
                );
            }
        }
    }
}

fn run(config: &CliConfig) -> Result<()> {
    let policy = load_policy(config)?;
    let store = JsonFileStore::new(&config.session);
    let mut engine = GradeEngine::new(store, policy);

    for notice in engine.restore()? {
        println!("⚠️  {}", notice);
    }

    if config.chart {
        print_chart();
    }

    let summary = match config.mode {
        CalculationKind::Sgpa => {
            print_sgpa(&engine);
            engine.calculate_sgpa()?
        }
        CalculationKind::Cgpa => {
            print_cgpa(&engine);
            engine.calculate_cgpa()?
        }
    };

    println!(
        "✅ {}: {} ({}) over {} credit hours",
        config.mode.label(),
        summary.display_value(),
        summary.letter,
        summary.total_credits
    );
    if config.mode == CalculationKind::Cgpa {
        println!("   {}", summary.standing.message());
    }

    if let Some(dir) = &config.export_dir {
        let student = config.student_info();
        let transcript = match config.mode {
            CalculationKind::Sgpa => Transcript::for_sgpa(engine.sgpa(), &student)?,
            CalculationKind::Cgpa => Transcript::for_cgpa(engine.cgpa(), &student)?,
        };
        let path = transcript.export_to_dir(Path::new(dir))?;
        println!("📁 Grade sheet saved to: {}", path.display());
    }

    if config.save {
        engine.save()?;
        println!("💾 Session saved to: {}", engine.store().path().display());
    }

    Ok(())
}
