use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use clap::Args;

use renthub::alerts::{AlertFrequency, MatchDispatcher, SavedSearch, SavedSearchId, SearchCriteria};
use renthub::catalog::{parse_feed, PropertySnapshot};
use renthub::error::AppError;
use renthub::verification::{
    AdminId, BackgroundStatus, DocumentType, IdentitySubmission, ReferenceRequest, ReferenceType,
    UserId, VerificationService,
};

use crate::infra::{
    default_trust_config, InMemoryAlertPublisher, InMemoryAuditTrail, InMemoryMatchRepository,
    InMemoryNoticePublisher, InMemoryPropertyCatalog, InMemoryReferenceRepository,
    InMemorySavedSearchRepository, InMemoryVerificationRepository,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Listings CSV export to seed the catalog (defaults to a built-in sample).
    #[arg(long)]
    pub(crate) feed: Option<PathBuf>,
    /// Skip the saved-search alerting portion of the demo.
    #[arg(long)]
    pub(crate) skip_alerts: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FeedImportArgs {
    /// Path to the listings CSV export.
    pub(crate) path: PathBuf,
}

const SAMPLE_FEED: &str = "\
Property ID,Title,City,Type,Nightly Rate,Bedrooms,Bathrooms,Sleeps,Amenities,Status
prop-101,Riverfront Loft,Des Moines,apartment,$150.00,2,1.5,4,WiFi|Washer / Dryer,available
prop-102,Garden Flat,Ames,condo,95,1,1,2,WiFi,available
prop-103,Pine Ridge Cabin,Boone,cabin,120,1,1,2,Fireplace|WiFi,pending
";

pub(crate) fn run_feed_import(args: FeedImportArgs) -> Result<(), AppError> {
    let raw = std::fs::read(&args.path)?;
    let snapshots = parse_feed(Cursor::new(raw))?;

    println!("Imported {} listings from {}", snapshots.len(), args.path.display());
    for snapshot in &snapshots {
        println!(
            "- {} | {} ({}) | {} | ${:.2}/night | sleeps {} | {}",
            snapshot.id.0,
            snapshot.title,
            snapshot.property_type.label(),
            snapshot.city,
            snapshot.price_per_night,
            snapshot.max_guests,
            snapshot.status.label()
        );
    }

    let available = snapshots.iter().filter(|snapshot| snapshot.is_available()).count();
    println!("{available} of {} listings are bookable", snapshots.len());

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("RentHub core services demo");

    let snapshots = load_feed(args.feed)?;
    run_verification_demo()?;
    if !args.skip_alerts {
        run_alerts_demo(snapshots)?;
    }

    Ok(())
}

fn load_feed(path: Option<PathBuf>) -> Result<Vec<PropertySnapshot>, AppError> {
    let snapshots = match path {
        Some(path) => parse_feed(Cursor::new(std::fs::read(path)?))?,
        None => parse_feed(Cursor::new(SAMPLE_FEED.as_bytes()))?,
    };
    println!("Loaded {} listings into the catalog", snapshots.len());
    Ok(snapshots)
}

fn run_verification_demo() -> Result<(), AppError> {
    println!("\nGuest verification walkthrough");

    let notices = Arc::new(InMemoryNoticePublisher::default());
    let audit = Arc::new(InMemoryAuditTrail::default());
    let service = VerificationService::new(
        Arc::new(InMemoryVerificationRepository::default()),
        Arc::new(InMemoryReferenceRepository::default()),
        audit.clone(),
        notices.clone(),
        default_trust_config(),
    );

    let guest = UserId("guest-demo".to_string());
    let admin = AdminId("admin-demo".to_string());

    let record = match service.submit_identity(
        &guest,
        IdentitySubmission {
            document_type: DocumentType::Passport,
            document_number: "P1234567".to_string(),
            document_expiry_date: NaiveDate::from_ymd_opt(2030, 6, 1),
            front_image: Some("uploads/id-front.jpg".to_string()),
            back_image: None,
            selfie_image: Some("uploads/selfie.jpg".to_string()),
        },
    ) {
        Ok(record) => record,
        Err(err) => {
            println!("  Identity submission rejected: {err}");
            return Ok(());
        }
    };
    print_standing("identity submitted", &record);

    let record = match service.approve_identity(&record.id, &admin, Utc::now()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Approval unavailable: {err}");
            return Ok(());
        }
    };
    print_standing("identity approved", &record);

    let record = match service.update_background(
        &record.id,
        BackgroundStatus::Clear,
        &admin,
        Utc::now(),
    ) {
        Ok(record) => record,
        Err(err) => {
            println!("  Background update unavailable: {err}");
            return Ok(());
        }
    };
    print_standing("background clear", &record);

    match service.add_reference(
        &guest,
        ReferenceRequest {
            name: "Dana Whitfield".to_string(),
            email: "dana@riverfrontlofts.example".to_string(),
            phone: None,
            reference_type: ReferenceType::PreviousLandlord,
            relationship: "Landlord 2023-2025".to_string(),
        },
    ) {
        Ok(reference) => {
            match service.verify_reference(&reference.verification_token, 5, None, Utc::now()) {
                Ok(_) => {}
                Err(err) => println!("  Reference confirmation failed: {err}"),
            }
        }
        Err(err) => println!("  Reference request rejected: {err}"),
    }

    match service.get_by_user(&guest) {
        Ok(record) => print_standing("reference verified", &record),
        Err(err) => println!("  Lookup unavailable: {err}"),
    }

    println!("  Audit trail:");
    for entry in audit.entries() {
        println!("    - {} by {}", entry.action, entry.actor.0);
    }
    println!("  Notifications dispatched: {}", notices.events().len());

    Ok(())
}

fn run_alerts_demo(snapshots: Vec<PropertySnapshot>) -> Result<(), AppError> {
    println!("\nSaved-search alerting walkthrough");

    let searches = Arc::new(InMemorySavedSearchRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let dispatcher = MatchDispatcher::new(
        searches,
        Arc::new(InMemoryMatchRepository::default()),
        Arc::new(InMemoryPropertyCatalog::default()),
        alerts.clone(),
    );

    let now = Utc::now();
    let search = SavedSearch {
        id: SavedSearchId("search-demo".to_string()),
        user_id: UserId("guest-demo".to_string()),
        name: "Central Iowa under $160".to_string(),
        criteria: SearchCriteria {
            max_price: Some(160.0),
            amenities: vec!["wifi".to_string()],
            ..SearchCriteria::default()
        },
        frequency: AlertFrequency::Daily,
        is_active: true,
        alerts_enabled: true,
        last_alert_sent_at: None,
        notification_count: 0,
    };

    let listing_count = snapshots.len();
    let ingest = match dispatcher.ingest_properties(snapshots, now) {
        Ok(summary) => summary,
        Err(err) => {
            println!("  Catalog ingest failed: {err}");
            return Ok(());
        }
    };
    println!("  Ingested {listing_count} listings ({} failures)", ingest.failures);

    let (stored, summary) = match dispatcher.create_search(search, now) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Search creation failed: {err}");
            return Ok(());
        }
    };
    println!(
        "  Search '{}' matched {} listings on creation ({} alert batch sent)",
        stored.name, summary.new_matches, summary.alerts_sent
    );

    // Next day's digest sweep: nothing new, so the cadence stays quiet.
    let digest = match dispatcher.on_scheduled_tick(AlertFrequency::Daily, now + Duration::hours(25)) {
        Ok(summary) => summary,
        Err(err) => {
            println!("  Digest sweep failed: {err}");
            return Ok(());
        }
    };
    println!(
        "  Daily digest: {} searches swept, {} alerts sent",
        digest.searches_evaluated, digest.alerts_sent
    );

    println!("  Alert payloads:");
    for alert in alerts.events() {
        println!(
            "    - template={} search={} properties={}",
            alert.template,
            alert.search_id.0,
            alert.properties.len()
        );
    }

    Ok(())
}

fn print_standing(stage: &str, record: &renthub::verification::GuestVerification) {
    let view = record.status_view();
    println!(
        "  [{stage}] trust score {:.2} | badge {} | can book: {}",
        view.trust_score, view.badge, view.can_book
    );
}
