//! Job listings published by organizations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::organization::Organization;
use crate::types::{JobListingId, OrganizationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "wage_interval", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WageInterval {
    Hourly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "location_requirement", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationRequirement {
    InOffice,
    Hybrid,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "job_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Internship,
    PartTime,
    FullTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "experience_level", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Junior,
    MidLevel,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "job_listing_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobListingStatus {
    Draft,
    Unlisted,
    Published,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: JobListingId,
    pub organization_id: OrganizationId,
    pub title: String,
    pub description: String,
    pub wage: Option<i32>,
    pub wage_interval: Option<WageInterval>,
    pub state_abbreviation: Option<String>,
    pub city: Option<String>,
    pub is_featured: bool,
    pub location_requirement: LocationRequirement,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    pub status: JobListingStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The organization as shown to job seekers next to a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOrganization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

impl From<Organization> for ListingOrganization {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            image_url: org.image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedJobListing {
    #[serde(flatten)]
    pub listing: JobListing,
    pub organization: ListingOrganization,
}

/// Body of both create and edit requests.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobListingRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub wage: Option<i32>,
    pub wage_interval: Option<WageInterval>,
    #[validate(length(equal = 2))]
    pub state_abbreviation: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub city: Option<String>,
    pub location_requirement: LocationRequirement,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobListingStatusRequest {
    pub status: JobListingStatus,
}

#[derive(Debug, Serialize)]
pub struct PublishedCount {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_screaming_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(LocationRequirement::InOffice).unwrap(),
            "IN_OFFICE"
        );
        let level: ExperienceLevel = serde_json::from_value("MID_LEVEL".into()).unwrap();
        assert_eq!(level, ExperienceLevel::MidLevel);
        assert!(serde_json::from_value::<JobListingStatus>("ARCHIVED".into()).is_err());
    }

    #[test]
    fn published_listing_nests_its_organization() {
        let now = Utc::now();
        let view = PublishedJobListing {
            listing: JobListing {
                id: JobListingId::from_i64(11),
                organization_id: OrganizationId::from_i64(3),
                title: "Backend engineer".into(),
                description: "Rust".into(),
                wage: None,
                wage_interval: None,
                state_abbreviation: None,
                city: None,
                is_featured: false,
                location_requirement: LocationRequirement::Remote,
                experience_level: ExperienceLevel::Junior,
                job_type: JobType::Internship,
                status: JobListingStatus::Published,
                posted_at: Some(now),
                created_at: now,
                updated_at: now,
            },
            organization: ListingOrganization {
                id: OrganizationId::from_i64(3),
                name: "Acme".into(),
                image_url: None,
            },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Backend engineer");
        assert_eq!(json["status"], "PUBLISHED");
        assert_eq!(json["organization"]["name"], "Acme");
        assert!(json["organization"]["imageURL"].is_null());
    }

    #[test]
    fn create_request_rejects_long_state_abbreviation() {
        let request: CreateJobListingRequest = serde_json::from_value(serde_json::json!({
            "title": "Backend engineer",
            "description": "Rust",
            "stateAbbreviation": "CAL",
            "locationRequirement": "REMOTE",
            "experienceLevel": "SENIOR",
            "jobType": "FULL_TIME"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("state_abbreviation"));
    }
}
