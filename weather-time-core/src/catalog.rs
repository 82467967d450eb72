//! Static city/country catalog backing the search screen.
//!
//! Common cities resolve here without touching the network; anything the
//! catalog does not know goes through the live-lookup fallback in
//! [`crate::resolver`].

pub struct CountryCities {
    pub country: &'static str,
    pub cities: &'static [&'static str],
}

pub const CATALOG: &[CountryCities] = &[
    CountryCities { country: "Australia", cities: &["Sydney", "Melbourne", "Brisbane", "Perth"] },
    CountryCities {
        country: "Brazil",
        cities: &["São Paulo", "Rio de Janeiro", "Brasília", "Salvador"],
    },
    CountryCities { country: "Canada", cities: &["Toronto", "Vancouver", "Montreal", "Ottawa"] },
    CountryCities { country: "China", cities: &["Beijing", "Shanghai", "Shenzhen", "Guangzhou"] },
    CountryCities { country: "Egypt", cities: &["Cairo", "Alexandria", "Giza"] },
    CountryCities { country: "France", cities: &["Paris", "Lyon", "Marseille", "Toulouse"] },
    CountryCities { country: "Germany", cities: &["Berlin", "Munich", "Hamburg", "Frankfurt"] },
    CountryCities { country: "India", cities: &["Mumbai", "Delhi", "Bangalore", "Chennai"] },
    CountryCities { country: "Italy", cities: &["Rome", "Milan", "Naples", "Turin"] },
    CountryCities { country: "Japan", cities: &["Tokyo", "Osaka", "Kyoto", "Nagoya"] },
    CountryCities { country: "Mexico", cities: &["Mexico City", "Guadalajara", "Monterrey"] },
    CountryCities { country: "Netherlands", cities: &["Amsterdam", "Rotterdam", "The Hague"] },
    CountryCities { country: "Russia", cities: &["Moscow", "Saint Petersburg", "Novosibirsk"] },
    CountryCities { country: "South Africa", cities: &["Johannesburg", "Cape Town", "Durban"] },
    CountryCities { country: "South Korea", cities: &["Seoul", "Busan", "Incheon"] },
    CountryCities { country: "Spain", cities: &["Madrid", "Barcelona", "Valencia", "Seville"] },
    CountryCities { country: "United Arab Emirates", cities: &["Dubai", "Abu Dhabi"] },
    CountryCities {
        country: "United Kingdom",
        cities: &["London", "Manchester", "Birmingham", "Edinburgh"],
    },
    CountryCities {
        country: "United States",
        cities: &["New York", "Los Angeles", "Chicago", "Houston", "Miami"],
    },
];

/// Case-insensitive substring search over city and country names. Matches are
/// returned as `"<city>, <country>"` in catalog order; an empty query yields
/// the whole catalog flattened.
pub fn filter(query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    let mut matches = Vec::new();

    for entry in CATALOG {
        let country_hit = entry.country.to_lowercase().contains(&needle);
        for city in entry.cities {
            if country_hit || city.to_lowercase().contains(&needle) {
                matches.push(format!("{city}, {}", entry.country));
            }
        }
    }

    matches
}

/// First catalog city whose name (not country) contains the query,
/// case-insensitively, as `"<city>, <country>"`.
pub fn find_city(query: &str) -> Option<String> {
    let needle = query.to_lowercase();

    for entry in CATALOG {
        for city in entry.cities {
            if city.to_lowercase().contains(&needle) {
                return Some(format!("{city}, {}", entry.country));
            }
        }
    }

    None
}
