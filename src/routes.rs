use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Per-route limiter config. `finish()` returns None for a zero burst size
// or a zero replenish interval, so both inputs are floored at 1; the unwrap
// can then never trip at startup.
fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let rpm = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(rpm)).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(rpm)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap()
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let submit_limiter = build_limiter(config.rate_submit_per_min);
    let query_limiter = build_limiter(config.rate_query_per_min);

    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/attendance")
                .service(
                    web::resource("/sheet")
                        .wrap(Governor::new(&submit_limiter))
                        .route(web::post().to(attendance::submit_sheet)),
                )
                .service(
                    web::resource("/day")
                        .wrap(Governor::new(&query_limiter))
                        .route(web::get().to(attendance::get_day)),
                )
                .service(
                    web::resource("/history")
                        .wrap(Governor::new(&query_limiter))
                        .route(web::get().to(attendance::get_history)),
                )
                .service(
                    web::resource("/scan")
                        .wrap(Governor::new(&submit_limiter))
                        .route(web::post().to(attendance::trigger_scan)),
                )
                .service(
                    web::resource("/range")
                        .wrap(Governor::new(&submit_limiter))
                        .route(web::delete().to(attendance::reset_range)),
                ),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_tolerates_degenerate_rates() {
        // A zero rate previously fed burst_size(0) into the builder, which
        // made finish() return None and panicked the server at startup.
        build_limiter(0);
        build_limiter(1);
        build_limiter(1_000_000);
    }
}
