//! Mock source producing a fixed set of listings
//!
//! Useful to exercise a full pass against a real marketplace without
//! touching any third-party site.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use gigsync_core::domain::Listing;
use tracing::info;

use super::SourceAdapter;

const NAME: &str = "test-platform";

#[derive(Debug, Default)]
pub struct DemoSource;

impl DemoSource {
    pub fn new() -> Self {
        Self
    }

    fn listing(id: &str, title: &str, company: &str, location: &str, job_type: &str) -> Listing {
        Listing {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            job_type: job_type.to_string(),
            apply_url: format!("https://example.com/jobs/{}", id),
            posted_at: Some(Utc::now()),
            ..Listing::new(NAME, id)
        }
    }
}

#[async_trait]
impl SourceAdapter for DemoSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn scrape(&self) -> Result<Vec<Listing>> {
        let mut react = Self::listing(
            "test-001",
            "Senior React Developer",
            "Tech Innovators Ltd",
            "Lagos, Nigeria",
            "full-time",
        );
        react.description =
            "We are seeking an experienced React developer to join our dynamic team.".to_string();
        react.skills = vec!["React".into(), "TypeScript".into(), "Node.js".into()];
        react.category = "Web Development".to_string();

        let mut backend = Self::listing(
            "test-002",
            "Backend Engineer (Node.js)",
            "StartupHub Nigeria",
            "Remote",
            "contract",
        );
        backend.description =
            "Looking for a skilled Node.js developer for a 6-month contract.".to_string();
        backend.skills = vec!["Node.js".into(), "Express".into(), "MongoDB".into()];
        backend.category = "Backend Development".to_string();
        backend.duration = Some("6 months".to_string());

        let mut design = Self::listing(
            "test-003",
            "UI/UX Designer",
            "Creative Solutions",
            "Abuja, Nigeria",
            "part-time",
        );
        design.description = "Seeking a creative UI/UX designer for part-time work.".to_string();
        design.skills = vec!["Figma".into(), "Adobe XD".into(), "UI Design".into()];
        design.category = "Design".to_string();

        let listings = vec![react, backend, design];
        info!("Generated {} demo listings", listings.len());
        Ok(listings)
    }
}
