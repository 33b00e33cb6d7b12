use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidateUrl, ValidationError};

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").unwrap();
}

/// Editable site sections stored as JSON blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSection {
    HeroNav,
    ContactInfo,
    Theme,
    Profile,
    Resume,
    TechStack,
}

impl ContentSection {
    pub const ALL: [ContentSection; 6] = [
        ContentSection::HeroNav,
        ContentSection::ContactInfo,
        ContentSection::Theme,
        ContentSection::Profile,
        ContentSection::Resume,
        ContentSection::TechStack,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ContentSection::HeroNav => "hero-nav",
            ContentSection::ContactInfo => "contact-info",
            ContentSection::Theme => "theme",
            ContentSection::Profile => "profile",
            ContentSection::Resume => "resume",
            ContentSection::TechStack => "tech-stack",
        }
    }

    pub fn storage_key(&self) -> &'static str {
        match self {
            ContentSection::HeroNav => "admin_hero_nav",
            ContentSection::ContactInfo => "admin_contact_info",
            ContentSection::Theme => "admin_theme_colors",
            ContentSection::Profile => "admin_profile",
            ContentSection::Resume => "admin_resume_url",
            ContentSection::TechStack => "admin_techstack",
        }
    }
}

impl fmt::Display for ContentSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ContentSection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ContentSection::ALL
            .into_iter()
            .find(|section| section.slug() == value)
            .ok_or_else(|| format!("Unknown content section: {}", value))
    }
}

/// A typed section document with a built-in default.
pub trait SectionDocument:
    Serialize + DeserializeOwned + Validate + Default + Send + Sync + 'static
{
    const SECTION: ContentSection;
}

fn url_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Must be a valid URL".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroNav {
    pub welcome_text: String,
    pub greeting: String,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    pub title1: String,
    pub title2: String,
    pub description: String,
    #[validate(custom(function = "url_or_empty"))]
    pub hero_image: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom(function = "url_or_empty"))]
    pub linkedin: String,
    #[validate(custom(function = "url_or_empty"))]
    pub github: String,
}

impl Default for HeroNav {
    fn default() -> Self {
        Self {
            welcome_text: "Welcome to my portfolio".to_string(),
            greeting: "Hi, I'm".to_string(),
            name: "Himani Singwal".to_string(),
            title1: "Data Analyst".to_string(),
            title2: "IT Professional".to_string(),
            description: "BCA Graduate specializing in Data Science, currently working as an IT \
                          Executive. Passionate about transforming data into actionable insights \
                          through analytics and visualization."
                .to_string(),
            hero_image: String::new(),
            email: "himani.singwal@example.com".to_string(),
            linkedin: "https://linkedin.com/in/himani-singwal".to_string(),
            github: "https://github.com/himanisingwal".to_string(),
        }
    }
}

impl SectionDocument for HeroNav {
    const SECTION: ContentSection = ContentSection::HeroNav;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ContactInfo {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom(function = "url_or_empty"))]
    pub linkedin: String,
    #[validate(custom(function = "url_or_empty"))]
    pub github: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            email: "himani.singwal@example.com".to_string(),
            linkedin: "https://linkedin.com/in/himani-singwal".to_string(),
            github: "https://github.com/himanisingwal".to_string(),
        }
    }
}

impl SectionDocument for ContactInfo {
    const SECTION: ContentSection = ContentSection::ContactInfo;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ThemeColors {
    #[validate(regex(path = *HEX_COLOR, message = "Must be a hex color"))]
    pub primary: String,
    #[validate(regex(path = *HEX_COLOR, message = "Must be a hex color"))]
    pub secondary: String,
    #[validate(regex(path = *HEX_COLOR, message = "Must be a hex color"))]
    pub background: String,
    #[validate(regex(path = *HEX_COLOR, message = "Must be a hex color"))]
    pub surface: String,
    #[validate(regex(path = *HEX_COLOR, message = "Must be a hex color"))]
    pub text: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#8B5CF6".to_string(),
            secondary: "#EC4899".to_string(),
            background: "#0A0A0A".to_string(),
            surface: "#1A1A1A".to_string(),
            text: "#FFFFFF".to_string(),
        }
    }
}

impl SectionDocument for ThemeColors {
    const SECTION: ContentSection = ContentSection::Theme;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[validate(length(min = 1, max = 100, message = "Full name must be between 1 and 100 characters"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: String,
    pub location: String,
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: String,
    #[validate(custom(function = "url_or_empty"))]
    pub avatar: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            full_name: "Himani Singwal".to_string(),
            email: "himani.singwal@example.com".to_string(),
            phone: String::new(),
            location: String::new(),
            bio: "I'm a passionate data professional on a mission to bridge the gap between \
                  data and decision-making."
                .to_string(),
            avatar: String::new(),
        }
    }
}

impl SectionDocument for Profile {
    const SECTION: ContentSection = ContentSection::Profile;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ResumeLink {
    #[validate(custom(function = "url_or_empty"))]
    pub url: String,
}

impl SectionDocument for ResumeLink {
    const SECTION: ContentSection = ContentSection::Resume;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct TechItem {
    #[validate(length(min = 1, message = "Id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, max = 60, message = "Name must be between 1 and 60 characters"))]
    pub name: String,
    #[validate(url(message = "Logo must be a valid URL"))]
    pub logo: String,
}

impl TechItem {
    fn new(id: &str, name: &str, logo: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            logo: logo.to_string(),
        }
    }
}

fn unique_tech_ids(stack: &TechStack) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if stack.items.iter().all(|item| seen.insert(item.id.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("unique_ids").with_message("Tech stack ids must be unique".into()))
    }
}

/// Stored as a bare JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(transparent)]
#[validate(schema(function = "unique_tech_ids"))]
pub struct TechStack {
    #[validate(nested)]
    pub items: Vec<TechItem>,
}

impl Default for TechStack {
    fn default() -> Self {
        const DEVICON: &str = "https://cdn.jsdelivr.net/gh/devicons/devicon/icons";
        Self {
            items: vec![
                TechItem::new("1", "Python", &format!("{DEVICON}/python/python-original.svg")),
                TechItem::new("2", "NumPy", &format!("{DEVICON}/numpy/numpy-original.svg")),
                TechItem::new("3", "Pandas", &format!("{DEVICON}/pandas/pandas-original.svg")),
                TechItem::new("4", "MySQL", &format!("{DEVICON}/mysql/mysql-original.svg")),
                TechItem::new(
                    "5",
                    "Power BI",
                    "https://upload.wikimedia.org/wikipedia/commons/c/cf/New_Power_BI_Logo.svg",
                ),
                TechItem::new(
                    "6",
                    "Excel",
                    "https://upload.wikimedia.org/wikipedia/commons/3/34/Microsoft_Office_Excel_%282019%E2%80%93present%29.svg",
                ),
            ],
        }
    }
}

impl SectionDocument for TechStack {
    const SECTION: ContentSection = ContentSection::TechStack;
}

pub const CONTACT_SUBMISSIONS_KEY: &str = "contact_submissions";

/// A message left through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Message must be between 1 and 5000 characters"
    ))]
    pub message: String,
}
