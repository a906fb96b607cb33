//! Site configuration, stored as a TOML file next to the binary.
//!
//! Keys keep the PascalCase spelling of the original `config.toml` so that
//! existing files load unchanged. Degree codes are derived on load and are
//! never written back.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// Which request attributes feed the voter fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FingerprintScheme {
    /// Client address and pepper only.
    #[default]
    Address,
    /// Client address, user-agent and pepper.
    AddressAndUserAgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Configuration {
    pub site_name: String,
    /// Campus, department and year shown under the site name.
    pub site_scope: String,
    pub site_port: u16,
    /// Salt for the voter fingerprint. Changing it resets every vote.
    pub voter_pepper: String,
    #[serde(default)]
    pub fingerprint_scheme: FingerprintScheme,
    /// Skips OTP delivery and accepts any code.
    pub dev_mode: bool,
    pub uni_email_domain: String,
    pub email_address: String,
    pub email_password: String,
    #[serde(rename = "EmailSMTPServer")]
    pub email_smtp_server: String,
    #[serde(rename = "DBConfig")]
    pub db_config: DatabaseConfiguration,
    pub instance_config: InstanceSettings,

    #[serde(skip)]
    loaded_degrees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseConfiguration {
    /// SQLite database file.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InstanceSettings {
    pub show_notice: bool,
    pub notice_text: String,
    pub notice_link: String,
    pub notice_title: String,
    /// alert-green, alert-yellow, alert-red or alert-grey
    pub notice_colour: String,
    pub links: Vec<ExternalResource>,
    pub class_reps: Vec<ClassRepresentative>,
    pub courses: Vec<Course>,
    pub lecturers: Vec<Lecturer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalResource {
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassRepresentative {
    pub name: String,
    pub email: String,
    pub course: String,
    pub degree_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    pub code: String,
    pub name: String,
    pub degree_code: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lecturer {
    pub name: String,
    pub email: String,
    pub office: String,
    pub updated: String,
}

/// Result of [`Configuration::load_or_generate`].
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Configuration),
    /// No file existed; defaults were written to disk.
    Generated,
}

impl Configuration {
    /// Parse and validate a TOML document, deriving the degree list.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Configuration = toml::from_str(content)?;
        config.validate()?;
        config.index_degrees();
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the file, or write the defaults if it does not exist yet.
    pub fn load_or_generate(path: &Path) -> Result<LoadOutcome, ConfigError> {
        if !path.exists() {
            info!("Generating new configuration file at {}", path.display());
            Configuration::default().save(path)?;
            return Ok(LoadOutcome::Generated);
        }
        Ok(LoadOutcome::Loaded(Self::from_file(path)?))
    }

    /// Write the configuration to disk, readable by the owner only.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Degree codes seen across all courses, deduplicated in first-seen order.
    pub fn loaded_degrees(&self) -> &[String] {
        &self.loaded_degrees
    }

    pub fn courses(&self) -> &[Course] {
        &self.instance_config.courses
    }

    pub fn class_reps(&self) -> &[ClassRepresentative] {
        &self.instance_config.class_reps
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.voter_pepper.trim().is_empty() {
            return Err(ConfigError::Validation("VoterPepper must not be empty".into()));
        }
        if self.site_port == 0 {
            return Err(ConfigError::Validation("SitePort must not be 0".into()));
        }
        for course in &self.instance_config.courses {
            if course.code.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "course \"{}\" has an empty code",
                    course.name
                )));
            }
        }
        Ok(())
    }

    fn index_degrees(&mut self) {
        let mut degrees: Vec<String> = Vec::new();
        for course in &self.instance_config.courses {
            for code in &course.degree_code {
                if !degrees.contains(code) {
                    degrees.push(code.clone());
                }
            }
        }
        self.loaded_degrees = degrees;
    }
}

impl Default for Configuration {
    fn default() -> Self {
        let mut config = Self {
            site_name: "Platform".into(),
            site_scope: "Edinburgh · MACS · Year 4".into(),
            site_port: 8080,
            voter_pepper: Uuid::new_v4().to_string(),
            fingerprint_scheme: FingerprintScheme::Address,
            dev_mode: true,
            uni_email_domain: "@hw.ac.uk".into(),
            email_address: "noreply@example.com".into(),
            email_password: "emailpasswordhere".into(),
            email_smtp_server: "smtp.example.com:587".into(),
            db_config: DatabaseConfiguration {
                path: "data.db".into(),
            },
            instance_config: default_instance(),
            loaded_degrees: Vec::new(),
        };
        config.index_degrees();
        config
    }
}

fn course(code: &str, name: &str, degrees: &[&str]) -> Course {
    Course {
        code: code.into(),
        name: name.into(),
        degree_code: degrees.iter().map(|d| d.to_string()).collect(),
    }
}

fn rep(name: &str, email: &str, course: &str, degree: &str) -> ClassRepresentative {
    ClassRepresentative {
        name: name.into(),
        email: email.into(),
        course: course.into(),
        degree_code: degree.into(),
    }
}

fn lecturer(name: &str, email: &str, office: &str) -> Lecturer {
    Lecturer {
        name: name.into(),
        email: email.into(),
        office: office.into(),
        updated: "04/08/20".into(),
    }
}

fn default_instance() -> InstanceSettings {
    const CS: &str = "F291-COS";
    const CSE: &str = "F2CC-CSE";
    const IS: &str = "F2IS-ISY";

    InstanceSettings {
        show_notice: true,
        notice_title: "Privacy Policy Update".into(),
        notice_text: "The privacy policy has been updated. Please consider re-reading it for your peace of mind.".into(),
        notice_link: "/privacy".into(),
        notice_colour: "alert-green".into(),
        links: vec![
            ExternalResource { name: "Courses".into(), link: "/courses".into() },
            ExternalResource { name: "Lecturers & Office Locations".into(), link: "/lecturers".into() },
        ],
        class_reps: vec![
            rep("Alakbar", "az40@hw.ac.uk", "Student Officer", CS),
            rep("Humaid", "ha82@hw.ac.uk", "Computer Science", CS),
            rep("Maleeha", "mr137@hw.ac.uk", "Computer Systems", CSE),
            rep("James", "jss2@hw.ac.uk", "Information Systems", IS),
        ],
        courses: vec![
            course("F20GA", "3D Graphics and Animation", &[CS, CSE]),
            course("F20AD", "Advanced Interaction Design", &[CS, CSE, IS]),
            course("F20AN", "Advanced Network Security", &[CS, CSE]),
            course("F20BD", "Big Data Management", &[CS, CSE, IS]),
            course("F20GP", "Computer Games Programming", &[CS, CSE]),
            course("F20DL", "Data Mining and Machine Learning", &[CS]),
            course("F20PB", "Design & Implementation", &[CS, CSE, IS]),
            course("F20DE", "Digital and Knowledge Economy", &[CSE, IS]),
            course("F28HS", "Hardware-Software Interface", &[CSE]),
            course("F20SC", "Industrial Programming", &[CS, CSE]),
            course("F20IF", "Information Systems Methodologies", &[CS, CSE, IS]),
            course("F20RO", "Intelligent Robotics", &[CS]),
            course("F20PA", "Research Methods & Requirements Engineering", &[CS, CSE, IS]),
            course("F20SF", "Software Engineering Foundations", &[IS]),
        ],
        lecturers: vec![
            lecturer("Andrew Ireland", "A.Ireland@hw.ac.uk", "EM G.57"),
            lecturer("Diana Bental", "D.S.Bental@hw.ac.uk", "EM 1.05"),
            lecturer("Manuel Maarek", "M.Maarek@hw.ac.uk", "EM 1.63"),
            lecturer("Michael Lones", "M.Lones@hw.ac.uk", "EM G.31"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = Configuration::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("SiteName"));
        assert!(text.contains("EmailSMTPServer"));
        assert!(!text.contains("loaded_degrees"));

        let parsed = Configuration::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn degrees_are_deduplicated_in_first_seen_order() {
        let config = Configuration::default();
        assert_eq!(config.loaded_degrees(), ["F291-COS", "F2CC-CSE", "F2IS-ISY"]);
    }

    #[test]
    fn empty_pepper_is_rejected() {
        let mut config = Configuration::default();
        config.voter_pepper = "  ".into();
        let text = config.to_toml().unwrap();
        assert!(matches!(
            Configuration::from_toml(&text),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Configuration::from_toml("SiteName = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_generated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(matches!(
            Configuration::load_or_generate(&path).unwrap(),
            LoadOutcome::Generated
        ));
        assert!(path.exists());
        assert!(matches!(
            Configuration::load_or_generate(&path).unwrap(),
            LoadOutcome::Loaded(_)
        ));
    }
}
