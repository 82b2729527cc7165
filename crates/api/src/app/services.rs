//! Wires Postgres-backed repositories into the domain services the route
//! handlers depend on, plus the shared [`AppConfig`] and JWT issuers.

use std::sync::Arc;

use bbqjudge_audit::{AuditRepository, AuditSink};
use bbqjudge_auth::{EitherPrincipal, SeatJwt, UserJwt};
use bbqjudge_entries::EntriesService;
use bbqjudge_infra::auth::PgUserRepository;
use bbqjudge_infra::audit::PgAuditRepository;
use bbqjudge_infra::config::AppConfig;
use bbqjudge_infra::entries::{PgScoreRepository, PgSubmissionRepository};
use bbqjudge_infra::rubric::{PgCategoryRepository, PgCriterionRepository};
use bbqjudge_infra::teams::PgTeamRepository;
use bbqjudge_infra::venue::{PgEventRepository, PgSeatRepository, PgTableRepository};
use bbqjudge_judging::JudgingService;
use bbqjudge_results::ResultsService;
use bbqjudge_rubric::RubricService;
use bbqjudge_teams::TeamsService;
use bbqjudge_venue::VenueService;

/// Every domain service plus the shared config and token issuers the routes
/// need. Constructed once at startup and shared behind an `Arc`.
pub struct AppServices {
    pub config: AppConfig,
    pub jwt_resolver: Arc<EitherPrincipal>,
    pub user_jwt: UserJwt,
    pub seat_jwt: SeatJwt,
    pub users: Arc<PgUserRepository>,
    pub venue: VenueService,
    pub rubric: RubricService,
    pub teams: TeamsService,
    pub entries: EntriesService,
    pub results: ResultsService,
    pub judging: JudgingService,
    pub audit: Arc<AuditSink>,
    pub audit_repo: Arc<dyn AuditRepository>,
}

/// Derive the two JWT namespace secrets from the single configured
/// `JWT_SECRET`. Keeping user and seat tokens on distinct derived secrets
/// means a leaked seat token can never be replayed as a user token, without
/// requiring a second environment variable.
fn derive_secret(base: &[u8], namespace: &str) -> Vec<u8> {
    let mut secret = base.to_vec();
    secret.push(b':');
    secret.extend_from_slice(namespace.as_bytes());
    secret
}

pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let pool = Arc::new(bbqjudge_infra::db::connect(&config.db).await?);

    let events = Arc::new(PgEventRepository::new(pool.clone()));
    let tables = Arc::new(PgTableRepository::new(pool.clone()));
    let seats = Arc::new(PgSeatRepository::new(pool.clone()));
    let categories = Arc::new(PgCategoryRepository::new(pool.clone()));
    let criteria = Arc::new(PgCriterionRepository::new(pool.clone()));
    let teams = Arc::new(PgTeamRepository::new(pool.clone()));
    let submissions = Arc::new(PgSubmissionRepository::new(pool.clone()));
    let scores = Arc::new(PgScoreRepository::new(pool.clone()));
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let audit_repo = Arc::new(PgAuditRepository::new(pool.clone()));

    let user_jwt = UserJwt::new(derive_secret(&config.jwt_secret, "user"));
    let seat_jwt = SeatJwt::new(derive_secret(&config.jwt_secret, "seat"));
    let jwt_resolver = Arc::new(EitherPrincipal::new(user_jwt.clone(), seat_jwt.clone()));

    let venue = VenueService::new(events.clone(), tables.clone(), seats.clone());
    let rubric = RubricService::new(events.clone(), categories.clone(), criteria.clone());
    let teams_service = TeamsService::new(events.clone(), teams.clone(), config.barcode_secret.clone());
    let entries = EntriesService::new(
        events.clone(),
        teams.clone(),
        categories.clone(),
        criteria.clone(),
        submissions.clone(),
        scores.clone(),
    );
    let results = ResultsService::new(
        events.clone(),
        seats.clone(),
        categories.clone(),
        criteria.clone(),
        submissions.clone(),
        scores.clone(),
    );
    let judging = JudgingService::new(categories.clone(), tables.clone(), seats.clone(), submissions.clone(), scores.clone());

    let audit = Arc::new(AuditSink::new(audit_repo.clone()));

    Ok(AppServices {
        config,
        jwt_resolver,
        user_jwt,
        seat_jwt,
        users,
        venue,
        rubric,
        teams: teams_service,
        entries,
        results,
        judging,
        audit,
        audit_repo,
    })
}
