use url::form_urlencoded;

use crate::domain::plan::{BookingLinks, LocalLinks, TravelLinks};

const IRCTC_SEARCH: &str = "https://www.irctc.co.in/nget/train-search";
const MAPS_SEARCH: &str = "https://www.google.com/maps/search";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HotelSearch {
    pub city: String,
    /// ISO `YYYY-MM-DD`.
    pub checkin: String,
    pub checkout: String,
    pub max_price_per_night: i64,
    pub people: u32,
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Lowercased, hyphen-joined and percent-encoded for use as a path segment.
fn slug(value: &str) -> String {
    encode(&value.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-"))
}

pub fn booking_links(search: &HotelSearch) -> BookingLinks {
    let city = encode(&format!("{}, India", search.city.trim()));
    let city_slug = slug(&search.city);
    let guests = search.people.max(1);
    let (checkin, checkout) = (encode(search.checkin.trim()), encode(search.checkout.trim()));
    let max_price_per_night = search.max_price_per_night;

    BookingLinks {
        booking_com: format!(
            "https://www.booking.com/searchresults.html?ss={city}&checkin={checkin}&checkout={checkout}&group_adults={guests}&no_rooms=1&order=price&nflt=price%3DINR-min-{max_price_per_night}-1"
        ),
        goibibo: format!(
            "https://www.goibibo.com/hotels/hotels-in-{city_slug}-ct/?checkin={checkin}&checkout={checkout}&guests={guests}&locusId=&locusType=city&searchText={city}"
        ),
        make_my_trip: format!(
            "https://www.makemytrip.com/hotels/hotel-listing/?city={city_slug}&checkin={checkin}&checkout={checkout}&roomStayQualifier=1e0e&sortBy=PRICE"
        ),
        hostelworld: format!(
            "https://www.hostelworld.com/s?q={city}&dateFrom={checkin}&dateTo={checkout}&guests={guests}"
        ),
    }
}

pub fn travel_links(from: &str, to: &str, date: &str) -> TravelLinks {
    let (from_encoded, to_encoded) = (encode(from.trim()), encode(to.trim()));
    let (from_slug, to_slug) = (slug(from), slug(to));
    let date = encode(date.trim());

    TravelLinks {
        red_bus: format!(
            "https://www.redbus.in/bus-tickets/{from_slug}-to-{to_slug}?fromCityName={from_encoded}&toCityName={to_encoded}&onward={date}"
        ),
        irctc: IRCTC_SEARCH.to_string(),
        google_flights: format!(
            "https://www.google.com/travel/flights?q=flights+from+{from_encoded}+to+{to_encoded}+on+{date}"
        ),
        ixigo: format!("https://www.ixigo.com/search/result/train/{from_slug}/{to_slug}/{date}"),
        make_my_trip_bus: format!("https://www.makemytrip.com/bus-tickets/{from_slug}-{to_slug}/"),
    }
}

pub fn local_links(city: &str) -> LocalLinks {
    let city = encode(city.trim());
    LocalLinks {
        food: format!("{MAPS_SEARCH}/restaurants+in+{city}/@?sort=rating"),
        scooty_rental: format!("{MAPS_SEARCH}/scooty+rental+in+{city}/"),
        sightseeing: format!("{MAPS_SEARCH}/tourist+places+in+{city}/"),
        cafes: format!("{MAPS_SEARCH}/cafes+in+{city}/"),
        atm: format!("{MAPS_SEARCH}/ATM+in+{city}/"),
    }
}
