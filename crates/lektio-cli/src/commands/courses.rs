//! Courses command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use lektio::Session;

#[derive(Args, Debug)]
pub struct CoursesArgs {
    /// List the public catalog instead of enrolled courses
    #[arg(long)]
    pub catalog: bool,
}

pub async fn run(session: &Session, args: CoursesArgs) -> Result<()> {
    if args.catalog {
        let courses = session
            .course_catalog()
            .await
            .context("Failed to fetch course catalog")?;

        for course in courses {
            let price = course.price.as_deref().unwrap_or("free");
            println!("{} ({})", course.title.bold(), price.dimmed());
        }
    } else {
        let enrollments = session
            .enrolled_courses()
            .await
            .context("Failed to fetch enrolled courses")?;

        if enrollments.is_empty() {
            println!("{}", "No enrolled courses.".dimmed());
        }
        for enrollment in enrollments {
            println!(
                "{} (enrolled {})",
                enrollment.course.title.bold(),
                enrollment.date.format("%Y-%m-%d").to_string().dimmed()
            );
        }
    }

    Ok(())
}
