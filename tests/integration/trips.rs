//! Trip checks across the catalog's routes and airports

use chrono::NaiveDate;
use longhaul_model::{
    Airport, AirportDraft, Route, RouteDraft, Trip, TripDraft, TripFlight, TripFlightDraft,
};
use longhaul_runtime::{Catalog, CatalogConfig, TripIssue};

fn catalog() -> Catalog {
    let c = Catalog::new(CatalogConfig::testing()).unwrap();
    c.airports()
        .save_all(
            [
                ("Auckland", "AKL", "NZAA", "New Zealand", -37.008, 174.792),
                ("Queenstown", "ZQN", "NZQN", "New Zealand", -45.021, 168.739),
                ("Brisbane", "BNE", "YBBN", "Australia", -27.384, 153.117),
            ]
            .map(|(name, iata, icao, country, lat, lon)| {
                Airport::new(
                    AirportDraft::default()
                        .with_name(name)
                        .with_city(name)
                        .with_country(country)
                        .with_iata(iata)
                        .with_icao(icao)
                        .with_position(lat, lon),
                )
                .unwrap()
            }),
        )
        .unwrap();
    c.routes()
        .save_all([
            Route::new(
                RouteDraft::new("NZ", "ZQN", "AKL")
                    .with_duration(110)
                    .with_price(180)
                    .with_takeoff_times([420, 840]),
            )
            .unwrap(),
            Route::new(
                RouteDraft::new("NZ", "AKL", "BNE")
                    .with_duration(210)
                    .with_price(390)
                    .with_takeoff_times([600, 1080]),
            )
            .unwrap(),
        ])
        .unwrap();
    c
}

fn leg(source: &str, destination: &str, day: u32, minute: i32) -> TripFlight {
    let date = NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
    TripFlight::new(TripFlightDraft::new(source, destination, "NZ").departing(date, minute)).unwrap()
}

fn trip(legs: Vec<TripFlight>) -> Trip {
    let mut trip = Trip::new(TripDraft::named("Ski and sun")).unwrap();
    trip.set_flights(legs);
    trip
}

#[test]
fn comfortable_itinerary_has_no_issues() {
    let c = catalog();
    let t = trip(vec![leg("ZQN", "AKL", 3, 420), leg("AKL", "BNE", 3, 1080)]);
    assert_eq!(c.trip_sanity_check(&t).unwrap(), vec![None, None]);

    let total: i32 = t.flights().iter().map(|f| c.flight_price(f).unwrap()).sum();
    assert_eq!(total, 570);
    let arrival = c.utc_landing(&t.flights()[1]).unwrap();
    assert_eq!(arrival.to_string(), "2024-07-03 21:30:00");
}

#[test]
fn tight_international_connection_warns() {
    let c = catalog();
    let t = trip(vec![leg("ZQN", "AKL", 3, 420), leg("AKL", "BNE", 3, 600)]);
    let issues = c.trip_sanity_check(&t).unwrap();
    let warning = issues[1].clone().unwrap();
    assert_eq!(warning, TripIssue::ShortInternationalLayover);
    assert!(!warning.is_error());
}

#[test]
fn saved_trip_flights_checked_for_clashes() {
    let c = catalog();
    let saved = c
        .trips()
        .save(trip(vec![leg("ZQN", "AKL", 3, 840)]))
        .unwrap();

    let clash = c
        .flight_clash(saved.flights(), &leg("ZQN", "AKL", 3, 840))
        .unwrap()
        .unwrap();
    assert_eq!(clash.source, "ZQN");
    assert!(c.flight_clash(saved.flights(), &leg("AKL", "BNE", 3, 1080)).unwrap().is_none());
}

#[test]
fn deleted_route_turns_legs_into_errors() {
    let c = catalog();
    let t = trip(vec![leg("ZQN", "AKL", 3, 420)]);
    let route = c
        .routes()
        .get_by_natural_key(&longhaul_model::RouteKey::new("NZ", "ZQN", "AKL"))
        .unwrap()
        .unwrap();
    c.routes().delete(longhaul_model::Record::id(&route).unwrap()).unwrap();

    let issues = c.trip_sanity_check(&t).unwrap();
    assert_eq!(issues, vec![Some(TripIssue::RouteMissing)]);
    assert!(issues[0].as_ref().is_some_and(TripIssue::is_error));
    assert!(c.flight_price(&t.flights()[0]).is_err());
}
