use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use tripgenie_core::domain::session::Session;
use tripgenie_core::domain::slots::TripType;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid slot pattern {pattern}: {err}"))
}

static BUDGET_THOUSANDS: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(\d[\d,]*)\s*k\b"));
static BUDGET_CURRENCY: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(\d[\d,]*)\s*(thousand|inr|rupee|rs|₹)"));
static BUDGET_PHRASE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)(?:budget|spend|have|within)\s*(?:is|of|:)?\s*(?:₹|rs\.?|inr)?\s*(\d[\d,]*)")
});
static BUDGET_SYMBOL: Lazy<Regex> = Lazy::new(|| compile(r"₹\s*(\d[\d,]*)"));
static BARE_BUDGET: Lazy<Regex> = Lazy::new(|| compile(r"^(\d{4,6})$"));

static DATE_RANGE_FULL: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)(\d{1,2})\s*([a-z]{3,})\s*(?:-|to|till)\s*(\d{1,2})\s*([a-z]{3,})")
});
static DATE_RANGE_SHARED_MONTH: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(\d{1,2})\s*(?:-|to|till)\s*(\d{1,2})\s*([a-z]{3,})"));

static EXPLICIT_PARTY: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)(\d+)\s*(?:person|people|pax|traveler|traveller|member|guest)")
});
static SOLO: Lazy<Regex> = Lazy::new(|| compile(r"\b(?:solo|alone|myself|just me|only me)\b"));
static COUPLE: Lazy<Regex> = Lazy::new(|| compile(r"\b(?:couple|us two|me and my)\b"));
static BARE_COUNT: Lazy<Regex> = Lazy::new(|| compile(r"^(\d+)$"));

const MIN_BUDGET: u32 = 500;
const BARE_BUDGET_RANGE: std::ops::RangeInclusive<u32> = 2_000..=500_000;
const PARTY_RANGE: std::ops::RangeInclusive<u32> = 1..=15;

const MONTHS: [&str; 12] =
    ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

const NUMBER_WORDS: [(&str, u8); 6] =
    [("one", 1), ("two", 2), ("three", 3), ("four", 4), ("five", 5), ("six", 6)];

const ORIGIN_CITIES: [&str; 22] = [
    "Delhi",
    "Mumbai",
    "Bangalore",
    "Bengaluru",
    "Chennai",
    "Kolkata",
    "Pune",
    "Hyderabad",
    "Chandigarh",
    "Lucknow",
    "Ahmedabad",
    "Jaipur",
    "Goa",
    "Udaipur",
    "Kochi",
    "Nagpur",
    "Indore",
    "Bhopal",
    "Surat",
    "Vadodara",
    "Noida",
    "Gurgaon",
];

const PREFERENCE_KEYWORDS: [(TripType, &[&str]); 5] = [
    (TripType::Beach, &["beach", "sea", "ocean", "coast", "water"]),
    (TripType::Mountains, &["mountain", "hill", "snow", "trek", "himalaya", "cold"]),
    (
        TripType::Culture,
        &["culture", "heritage", "temple", "history", "palace", "fort", "spiritual"],
    ),
    (TripType::Adventure, &["adventure", "rafting", "bungee", "sport", "thrill", "wildlife"]),
    (TripType::Mix, &["mix", "anything", "open", "surprise"]),
];

/// Place names recognised as a destination pick, in match priority order.
pub const KNOWN_DESTINATIONS: [&str; 94] = [
    "Manali",
    "Kasol",
    "Rishikesh",
    "Jaipur",
    "Goa",
    "Udaipur",
    "Mcleodganj",
    "Varanasi",
    "Pondicherry",
    "Mussoorie",
    "Tosh",
    "Dharamshala",
    "Shimla",
    "Munnar",
    "Ooty",
    "Darjeeling",
    "Leh",
    "Ladakh",
    "Hampi",
    "Alleppey",
    "Kochi",
    "Coorg",
    "Agra",
    "Delhi",
    "Mumbai",
    "Srinagar",
    "Gulmarg",
    "Pahalgam",
    "Jaisalmer",
    "Jodhpur",
    "Pushkar",
    "Gangtok",
    "Shillong",
    "Tawang",
    "Ziro",
    "Cherrapunji",
    "Kaziranga",
    "Majuli",
    "Varkala",
    "Wayanad",
    "Gokarna",
    "Mysore",
    "Kodaikanal",
    "Rameswaram",
    "Madurai",
    "Mahabalipuram",
    "Kanyakumari",
    "Thanjavur",
    "Amritsar",
    "Khajuraho",
    "Orchha",
    "Gwalior",
    "Bhopal",
    "Indore",
    "Pachmarhi",
    "Nashik",
    "Aurangabad",
    "Lonavala",
    "Mahabaleshwar",
    "Ajanta",
    "Ellora",
    "Kolkata",
    "Kalimpong",
    "Sundarbans",
    "Digha",
    "Puri",
    "Konark",
    "Bhubaneswar",
    "Chilika",
    "Nainital",
    "Almora",
    "Ranikhet",
    "Auli",
    "Kedarnath",
    "Badrinath",
    "Haridwar",
    "Dehradun",
    "Lansdowne",
    "Valley of Flowers",
    "Spiti",
    "Kaza",
    "Chisul",
    "Nubra",
    "Turtuk",
    "Kargil",
    "Drass",
    "Sonamarg",
    "Yusmarg",
    "Doodhpathri",
    "Gurez",
    "Patnitop",
    "Bhaderwah",
    "Katra",
    "Havelock Island",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

/// A slot value accepted from one utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractedSlot {
    Budget(u32),
    Dates(DateRange),
    PartySize(u8),
    Origin(String),
    Preference(TripType),
    Destination(String),
}

impl ExtractedSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Budget(_) => "budget",
            Self::Dates(_) => "dates",
            Self::PartySize(_) => "party_size",
            Self::Origin(_) => "origin",
            Self::Preference(_) => "preference",
            Self::Destination(_) => "destination",
        }
    }
}

/// Fills empty session slots from free text.
///
/// Matchers run in a fixed order (budget, dates, party size, origin,
/// preference, destination) and never overwrite a slot that is already set.
/// The selected destination is the exception: naming a different place
/// switches to it. Any new budget, dates, party size or origin drops the
/// cached breakdown, which was priced without them.
#[derive(Clone, Copy, Debug)]
pub struct SlotExtractor {
    year: i32,
}

impl SlotExtractor {
    /// `year` anchors day-month ranges, which never name a year.
    pub fn for_year(year: i32) -> Self {
        Self { year }
    }

    pub fn apply(&self, session: &mut Session, message: &str) -> Vec<ExtractedSlot> {
        let mut accepted = Vec::new();
        let slots = &mut session.slots;

        if slots.budget.is_none() {
            if let Some(budget) = match_budget(message) {
                slots.budget = Some(budget);
                accepted.push(ExtractedSlot::Budget(budget));
            }
        }

        if slots.start_date.is_none() {
            if let Some(range) = match_dates(message, self.year) {
                slots.start_date = Some(range.start);
                slots.end_date = Some(range.end);
                slots.trip_days = Some(range.days);
                accepted.push(ExtractedSlot::Dates(range));
            }
        }

        if slots.party_size.is_none() {
            if let Some(party) = match_party_size(message) {
                slots.party_size = Some(party);
                accepted.push(ExtractedSlot::PartySize(party));
            }
        }

        if slots.origin.is_none() {
            if let Some(origin) = match_origin(message) {
                slots.origin = Some(origin.to_string());
                accepted.push(ExtractedSlot::Origin(origin.to_string()));
            }
        }

        if slots.preference.is_none() {
            if let Some(preference) = match_preference(message) {
                slots.preference = Some(preference);
                accepted.push(ExtractedSlot::Preference(preference));
            }
        }

        let reprices = accepted.iter().any(|slot| {
            matches!(
                slot,
                ExtractedSlot::Budget(_)
                    | ExtractedSlot::Dates(_)
                    | ExtractedSlot::PartySize(_)
                    | ExtractedSlot::Origin(_)
            )
        });
        if reprices {
            session.budget_breakdown = None;
        }

        if let Some(destination) = match_destination(
            message,
            session.slots.origin.as_deref(),
            session.selected_destination.as_deref(),
        ) {
            session.select_destination(destination);
            accepted.push(ExtractedSlot::Destination(destination.to_string()));
        }

        for slot in &accepted {
            debug!(
                event_name = "agent.slot_extracted",
                session_id = %session.id,
                slot = slot.name(),
                value = ?slot,
                "slot accepted from message"
            );
        }

        accepted
    }
}

fn parse_amount(raw: &str) -> Option<u32> {
    raw.replace(',', "").parse().ok()
}

/// Total budget in INR. Amounts under a thousand are scaled when written
/// with a thousands unit ("20k", "15 thousand").
pub fn match_budget(message: &str) -> Option<u32> {
    let thousands = BUDGET_THOUSANDS.captures(message).map(|caps| (caps, true));
    let matched = thousands
        .or_else(|| {
            BUDGET_CURRENCY.captures(message).map(|caps| {
                let scaled = caps
                    .get(2)
                    .is_some_and(|unit| unit.as_str().eq_ignore_ascii_case("thousand"));
                (caps, scaled)
            })
        })
        .or_else(|| BUDGET_PHRASE.captures(message).map(|caps| (caps, false)))
        .or_else(|| BUDGET_SYMBOL.captures(message).map(|caps| (caps, false)));

    match matched {
        Some((caps, scaled)) => {
            let mut amount = caps.get(1).and_then(|raw| parse_amount(raw.as_str()))?;
            if scaled && amount < 1_000 {
                amount = amount.saturating_mul(1_000);
            }
            (amount >= MIN_BUDGET).then_some(amount)
        }
        None => {
            let trimmed = message.trim();
            let caps = BARE_BUDGET.captures(trimmed)?;
            let amount = parse_amount(&caps[1])?;
            BARE_BUDGET_RANGE.contains(&amount).then_some(amount)
        }
    }
}

fn month_number(word: &str) -> Option<u32> {
    let prefix = word.get(..3)?.to_ascii_lowercase();
    MONTHS.iter().position(|month| *month == prefix).map(|index| index as u32 + 1)
}

fn date_range(year: i32, start: (u32, u32), end: (u32, u32)) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, start.0, start.1)?;
    let end = NaiveDate::from_ymd_opt(year, end.0, end.1)?;
    let span = (end - start).num_days() + 1;
    let days = u32::try_from(span.max(1)).unwrap_or(1);
    Some(DateRange { start, end, days })
}

/// "20 Feb to 25 Feb" style first, then "20-25 Feb". Impossible calendar
/// dates yield nothing.
pub fn match_dates(message: &str, year: i32) -> Option<DateRange> {
    if let Some(caps) = DATE_RANGE_FULL.captures(message) {
        if let (Some(start_month), Some(end_month)) =
            (month_number(&caps[2]), month_number(&caps[4]))
        {
            let start_day = caps[1].parse().ok()?;
            let end_day = caps[3].parse().ok()?;
            return date_range(year, (start_month, start_day), (end_month, end_day));
        }
    }

    let caps = DATE_RANGE_SHARED_MONTH.captures(message)?;
    let month = month_number(&caps[3])?;
    let start_day = caps[1].parse().ok()?;
    let end_day = caps[2].parse().ok()?;
    date_range(year, (month, start_day), (month, end_day))
}

pub fn match_party_size(message: &str) -> Option<u8> {
    if let Some(caps) = EXPLICIT_PARTY.captures(message) {
        let count: u32 = caps[1].parse().ok()?;
        return PARTY_RANGE.contains(&count).then(|| count as u8);
    }

    let lowered = message.trim().to_lowercase();
    if SOLO.is_match(&lowered) {
        return Some(1);
    }
    if COUPLE.is_match(&lowered) {
        return Some(2);
    }

    if let Some(caps) = BARE_COUNT.captures(&lowered) {
        let count: u32 = caps[1].parse().ok()?;
        return PARTY_RANGE.contains(&count).then(|| count as u8);
    }

    NUMBER_WORDS.iter().find(|(word, _)| *word == lowered).map(|(_, count)| *count)
}

pub fn match_origin(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    let city = ORIGIN_CITIES.iter().find(|city| lowered.contains(&city.to_lowercase()))?;
    Some(if *city == "Bengaluru" { "Bangalore" } else { *city })
}

pub fn match_preference(message: &str) -> Option<TripType> {
    let lowered = message.to_lowercase();
    PREFERENCE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(kind, _)| *kind)
}

fn named_as_departure(lowered: &str, place: &str) -> bool {
    let pattern =
        format!(r"(?:from|start|leaving|departure)\s+(?:in\s+)?{}", regex::escape(place));
    Regex::new(&pattern).map(|departure| departure.is_match(lowered)).unwrap_or(false)
}

/// First known place in the message that is neither the origin, a place the
/// traveller is leaving from, nor the current pick.
pub fn match_destination(
    message: &str,
    origin: Option<&str>,
    current: Option<&str>,
) -> Option<&'static str> {
    let lowered = message.to_lowercase();

    for place in KNOWN_DESTINATIONS {
        let place_lower = place.to_lowercase();
        if !lowered.contains(&place_lower) {
            continue;
        }
        if origin.is_some_and(|origin| origin.eq_ignore_ascii_case(place)) {
            continue;
        }
        if named_as_departure(&lowered, &place_lower) {
            continue;
        }
        if current.is_some_and(|current| current.eq_ignore_ascii_case(place)) {
            continue;
        }
        return Some(place);
    }

    None
}
