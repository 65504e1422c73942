pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::{CalculationKind, CliConfig};

#[cfg(feature = "cli")]
mod args {
    use crate::domain::model::StudentInfo;
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_path, Validate};
    use clap::{Parser, ValueEnum};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
    pub enum CalculationKind {
        Sgpa,
        Cgpa,
    }

    impl CalculationKind {
        pub fn label(&self) -> &'static str {
            match self {
                Self::Sgpa => "SGPA",
                Self::Cgpa => "CGPA",
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "gradesheet")]
    #[command(about = "Semester and cumulative GPA calculator")]
    pub struct CliConfig {
        #[arg(long, default_value = "./gradesheet-session.json")]
        pub session: String,

        #[arg(long, help = "TOML file overriding the grading policy")]
        pub policy: Option<String>,

        #[arg(long, value_enum, default_value = "sgpa")]
        pub mode: CalculationKind,

        #[arg(long, help = "Write a CSV grade sheet into this directory")]
        pub export_dir: Option<String>,

        #[arg(long)]
        pub student_name: Option<String>,

        #[arg(long)]
        pub father_name: Option<String>,

        #[arg(long)]
        pub registration: Option<String>,

        #[arg(long, help = "Print the marks-based grading chart")]
        pub chart: bool,

        #[arg(long, help = "Write the normalised session back to disk")]
        pub save: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Student details for the grade sheet; missing flags stay blank and
        /// fail validation at export time.
        pub fn student_info(&self) -> StudentInfo {
            StudentInfo {
                name: self.student_name.clone().unwrap_or_default(),
                father_name: self.father_name.clone().unwrap_or_default(),
                registration_number: self.registration.clone().unwrap_or_default(),
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("session", &self.session)?;
            if let Some(policy) = &self.policy {
                validate_path("policy", policy)?;
            }
            if let Some(dir) = &self.export_dir {
                validate_path("export_dir", dir)?;
            }
            Ok(())
        }
    }

}
