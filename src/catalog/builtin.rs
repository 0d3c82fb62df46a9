//! Source-language (English) content of the visa hub pages.

use super::{Catalog, ContentBlock};

/// Build the catalog shipped with the site
pub fn visa_hub_catalog() -> Catalog {
    Catalog::new()
        .with_section(
            "home",
            "hero",
            ContentBlock::new()
                .text("title", "Your Trusted Guide to Thai Visas")
                .text(
                    "subtitle",
                    "Clear answers, practical tools and expert help for expats moving to Thailand.",
                )
                .block(
                    "cta",
                    ContentBlock::new()
                        .text("primary", "Find my visa")
                        .text("secondary", "Talk to an expert"),
                ),
        )
        .with_section(
            "home",
            "features",
            ContentBlock::new()
                .text("heading", "Everything you need in one place")
                .list(
                    "items",
                    &[
                        "Visa navigator that matches your situation",
                        "Cost and timeline calculators",
                        "Maps of immigration offices",
                        "An AI assistant available around the clock",
                    ],
                ),
        )
        .with_section(
            "visa_navigator",
            "intro",
            ContentBlock::new()
                .text("title", "Visa Navigator")
                .text(
                    "description",
                    "Answer a few questions and we will suggest the visa types that fit your plans.",
                ),
        )
        .with_section(
            "visa_navigator",
            "questions",
            ContentBlock::new()
                .text("purpose", "What is the main purpose of your stay?")
                .text("duration", "How long do you plan to stay in Thailand?")
                .text("age", "Are you 50 years of age or older?")
                .list("purposes", &["Work", "Retirement", "Study", "Remote work", "Family"]),
        )
        .with_section(
            "dtv_visa",
            "overview",
            ContentBlock::new()
                .text("title", "Destination Thailand Visa (DTV)")
                .text(
                    "summary",
                    "A five-year multiple entry visa for remote workers and participants in Thai cultural activities.",
                ),
        )
        .with_section(
            "dtv_visa",
            "requirements",
            ContentBlock::new()
                .text("heading", "Requirements")
                .list(
                    "documents",
                    &[
                        "Passport valid for at least six months",
                        "Proof of funds of at least 500,000 THB",
                        "Proof of remote employment or activity enrolment",
                    ],
                ),
        )
        .with_section(
            "retirement_visa",
            "overview",
            ContentBlock::new()
                .text("title", "Retirement Visa (Non-O / O-A)")
                .text(
                    "summary",
                    "Long stay options for applicants aged 50 and over with the required financial proof.",
                ),
        )
        .with_section(
            "calculators",
            "intro",
            ContentBlock::new()
                .text("title", "Visa Cost Calculator")
                .text("description", "Estimate government fees, agency costs and timelines.")
                .block(
                    "labels",
                    ContentBlock::new()
                        .text("visa_type", "Visa type")
                        .text("applicants", "Number of applicants")
                        .text("total", "Estimated total"),
                ),
        )
        .with_section(
            "knowledge_hub",
            "header",
            ContentBlock::new()
                .text("title", "Knowledge Hub")
                .text("subtitle", "Guides and experiences shared by the expat community."),
        )
        .with_section(
            "contact",
            "form",
            ContentBlock::new()
                .text("title", "Contact us")
                .text("name", "Your name")
                .text("email", "Email address")
                .text("message", "How can we help?")
                .text("submit", "Send message"),
        )
}
