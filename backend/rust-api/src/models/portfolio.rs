use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Ordered portfolio tables edited from the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortfolioTable {
    About,
    Experiences,
    Projects,
    ProjectCategories,
    Skills,
    SkillCategories,
}

impl PortfolioTable {
    /// Collection / table name in the backing store.
    pub fn name(&self) -> &'static str {
        match self {
            PortfolioTable::About => "about",
            PortfolioTable::Experiences => "experiences",
            PortfolioTable::Projects => "projects",
            PortfolioTable::ProjectCategories => "project_categories",
            PortfolioTable::Skills => "skills",
            PortfolioTable::SkillCategories => "skill_categories",
        }
    }

    /// URL segment.
    pub fn slug(&self) -> &'static str {
        match self {
            PortfolioTable::About => "about",
            PortfolioTable::Experiences => "experiences",
            PortfolioTable::Projects => "projects",
            PortfolioTable::ProjectCategories => "project-categories",
            PortfolioTable::Skills => "skills",
            PortfolioTable::SkillCategories => "skill-categories",
        }
    }
}

impl fmt::Display for PortfolioTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How rows of a table are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    OrderIndex,
    Name,
}

/// A row type backed by one portfolio table.
pub trait PortfolioRow: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: PortfolioTable;
    const ORDER: RowOrder = RowOrder::OrderIndex;
    /// Singular label used in messages ("Project not found").
    const LABEL: &'static str;

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn from_create(id: String, request: Self::Create, order_index: i32, now: DateTime<Utc>)
        -> Self;
    fn apply_update(&mut self, request: Self::Update, now: DateTime<Utc>);
    fn id(&self) -> &str;

    /// Explicit position from a create request, if the caller gave one.
    fn requested_order(_request: &Self::Create) -> Option<i32> {
        None
    }

    fn order_index(&self) -> Option<i32> {
        None
    }

    fn set_order_index(&mut self, _order_index: i32) {}

    fn sort_name(&self) -> &str {
        ""
    }

    /// Cross-field checks on a row after a partial update was merged in.
    fn validate_merged(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

fn http_url(value: &str) -> Result<(), ValidationError> {
    use validator::ValidateUrl;
    if value.validate_url() && (value.starts_with("http://") || value.starts_with("https://")) {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Must be an http(s) URL".into()))
    }
}

macro_rules! ordered_row {
    () => {
        fn order_index(&self) -> Option<i32> {
            Some(self.order_index)
        }

        fn set_order_index(&mut self, order_index: i32) {
            self.order_index = order_index;
        }
    };
}

// ---------------------------------------------------------------- about

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct About {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAboutRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub image_url: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAboutRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub image_url: Option<String>,
}

impl PortfolioRow for About {
    const TABLE: PortfolioTable = PortfolioTable::About;
    const LABEL: &'static str = "About entry";

    type Create = CreateAboutRequest;
    type Update = UpdateAboutRequest;

    fn from_create(id: String, request: Self::Create, order_index: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: request.title,
            description: request.description,
            image_url: request.image_url,
            order_index,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, request: Self::Update, now: DateTime<Utc>) {
        if let Some(title) = request.title {
            self.title = title;
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if request.image_url.is_some() {
            self.image_url = request.image_url;
        }
        self.updated_at = now;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn requested_order(request: &Self::Create) -> Option<i32> {
        request.order_index
    }

    ordered_row!();
}

// ---------------------------------------------------------------- experiences

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn experience_dates(request: &CreateExperienceRequest) -> Result<(), ValidationError> {
    check_dates(request.start_date, request.end_date, request.is_current)
}

fn check_dates(
    start: NaiveDate,
    end: Option<NaiveDate>,
    is_current: bool,
) -> Result<(), ValidationError> {
    match end {
        Some(_) if is_current => Err(ValidationError::new("end_date")
            .with_message("A current position cannot have an end date".into())),
        Some(end) if end < start => Err(ValidationError::new("end_date")
            .with_message("End date must not be before start date".into())),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "experience_dates"))]
pub struct CreateExperienceRequest {
    #[validate(length(min = 1, max = 200, message = "Company must be between 1 and 200 characters"))]
    pub company: String,
    #[validate(length(min = 1, max = 200, message = "Position must be between 1 and 200 characters"))]
    pub position: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub location: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub logo_url: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateExperienceRequest {
    #[validate(length(min = 1, max = 200, message = "Company must be between 1 and 200 characters"))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Position must be between 1 and 200 characters"))]
    pub position: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: Option<bool>,
    pub location: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub logo_url: Option<String>,
}

impl Experience {
    /// Re-checks the date range after a partial update has been merged.
    pub fn validate_dates(&self) -> Result<(), ValidationError> {
        check_dates(self.start_date, self.end_date, self.is_current)
    }
}

impl PortfolioRow for Experience {
    const TABLE: PortfolioTable = PortfolioTable::Experiences;
    const LABEL: &'static str = "Experience";

    type Create = CreateExperienceRequest;
    type Update = UpdateExperienceRequest;

    fn from_create(id: String, request: Self::Create, order_index: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            company: request.company,
            position: request.position,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            is_current: request.is_current,
            location: request.location,
            logo_url: request.logo_url,
            order_index,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, request: Self::Update, now: DateTime<Utc>) {
        if let Some(company) = request.company {
            self.company = company;
        }
        if let Some(position) = request.position {
            self.position = position;
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if let Some(start_date) = request.start_date {
            self.start_date = start_date;
        }
        if let Some(is_current) = request.is_current {
            self.is_current = is_current;
            if is_current {
                self.end_date = None;
            }
        }
        if request.end_date.is_some() {
            self.end_date = request.end_date;
        }
        if request.location.is_some() {
            self.location = request.location;
        }
        if request.logo_url.is_some() {
            self.logo_url = request.logo_url;
        }
        self.updated_at = now;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn requested_order(request: &Self::Create) -> Option<i32> {
        request.order_index
    }

    fn validate_merged(&self) -> Result<(), ValidationError> {
        self.validate_dates()
    }

    ordered_row!();
}

// ---------------------------------------------------------------- projects

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub github_url: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub live_url: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 30, message = "At most 30 technologies"))]
    pub technologies: Vec<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub github_url: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub live_url: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub image_url: Option<String>,
    #[validate(length(max = 30, message = "At most 30 technologies"))]
    pub technologies: Option<Vec<String>>,
}

impl PortfolioRow for Project {
    const TABLE: PortfolioTable = PortfolioTable::Projects;
    const LABEL: &'static str = "Project";

    type Create = CreateProjectRequest;
    type Update = UpdateProjectRequest;

    fn from_create(id: String, request: Self::Create, order_index: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: request.title,
            description: request.description,
            category_id: request.category_id,
            github_url: request.github_url,
            live_url: request.live_url,
            image_url: request.image_url,
            technologies: request.technologies,
            order_index,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, request: Self::Update, now: DateTime<Utc>) {
        if let Some(title) = request.title {
            self.title = title;
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if request.category_id.is_some() {
            self.category_id = request.category_id;
        }
        if request.github_url.is_some() {
            self.github_url = request.github_url;
        }
        if request.live_url.is_some() {
            self.live_url = request.live_url;
        }
        if request.image_url.is_some() {
            self.image_url = request.image_url;
        }
        if let Some(technologies) = request.technologies {
            self.technologies = technologies;
        }
        self.updated_at = now;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn requested_order(request: &Self::Create) -> Option<i32> {
        request.order_index
    }

    ordered_row!();
}

// ---------------------------------------------------------------- project categories

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectCategory {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProjectCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
}

impl PortfolioRow for ProjectCategory {
    const TABLE: PortfolioTable = PortfolioTable::ProjectCategories;
    const ORDER: RowOrder = RowOrder::Name;
    const LABEL: &'static str = "Project category";

    type Create = CreateProjectCategoryRequest;
    type Update = UpdateProjectCategoryRequest;

    fn from_create(id: String, request: Self::Create, _order_index: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: request.name,
            created_at: now,
        }
    }

    fn apply_update(&mut self, request: Self::Update, _now: DateTime<Utc>) {
        if let Some(name) = request.name {
            self.name = name;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------- skills

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: Option<String>,
    pub logo_url: Option<String>,
    pub category_id: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSkillRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "Level must be at most 50 characters"))]
    pub level: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub logo_url: Option<String>,
    pub category_id: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSkillRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 50, message = "Level must be at most 50 characters"))]
    pub level: Option<String>,
    #[validate(custom(function = "http_url"))]
    pub logo_url: Option<String>,
    pub category_id: Option<String>,
}

impl PortfolioRow for Skill {
    const TABLE: PortfolioTable = PortfolioTable::Skills;
    const LABEL: &'static str = "Skill";

    type Create = CreateSkillRequest;
    type Update = UpdateSkillRequest;

    fn from_create(id: String, request: Self::Create, order_index: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: request.name,
            level: request.level,
            logo_url: request.logo_url,
            category_id: request.category_id,
            order_index,
            created_at: now,
        }
    }

    fn apply_update(&mut self, request: Self::Update, _now: DateTime<Utc>) {
        if let Some(name) = request.name {
            self.name = name;
        }
        if request.level.is_some() {
            self.level = request.level;
        }
        if request.logo_url.is_some() {
            self.logo_url = request.logo_url;
        }
        if request.category_id.is_some() {
            self.category_id = request.category_id;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn requested_order(request: &Self::Create) -> Option<i32> {
        request.order_index
    }

    ordered_row!();
}

// ---------------------------------------------------------------- skill categories

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillCategory {
    pub id: String,
    pub title: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSkillCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSkillCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl PortfolioRow for SkillCategory {
    const TABLE: PortfolioTable = PortfolioTable::SkillCategories;
    const LABEL: &'static str = "Skill category";

    type Create = CreateSkillCategoryRequest;
    type Update = UpdateSkillCategoryRequest;

    fn from_create(id: String, request: Self::Create, order_index: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: request.title,
            icon: request.icon,
            color: request.color,
            order_index,
            created_at: now,
        }
    }

    fn apply_update(&mut self, request: Self::Update, _now: DateTime<Utc>) {
        if let Some(title) = request.title {
            self.title = title;
        }
        if request.icon.is_some() {
            self.icon = request.icon;
        }
        if request.color.is_some() {
            self.color = request.color;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn requested_order(request: &Self::Create) -> Option<i32> {
        request.order_index
    }

    ordered_row!();
}

/// Body of `POST /admin/portfolio/{table}/reorder`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<String>,
}
