//! Deterministic identity and geography pools.
//!
//! Provides realistic names, employers, positions, and EMEA addresses for
//! the population and update-feed generators. All generation is
//! deterministic (same RNG seed = same output) — no external locale data.

use crate::rng::StreamRng;

/// A country the bank operates in, with the reference data the address
/// and customer generators need to keep rows internally consistent.
pub struct Country {
    pub name: &'static str,
    pub currency: &'static str,
    pub cities: &'static [&'static str],
    pub regions: &'static [&'static str],
}

/// Deterministic name/address generator using curated pools.
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a first name from the curated list.
    pub fn first_name(rng: &mut StreamRng) -> &'static str {
        *rng.pick(Self::first_names())
    }

    /// Generate a family name from the curated list.
    pub fn family_name(rng: &mut StreamRng) -> &'static str {
        *rng.pick(Self::family_names())
    }

    /// Generate an employer name: "Prefix Industry Suffix" or
    /// "FamilyName Industry Suffix".
    pub fn employer(rng: &mut StreamRng) -> String {
        let industry = *rng.pick(Self::industries());
        let suffix = *rng.pick(Self::company_suffixes());
        if rng.chance(0.5) {
            let prefix = *rng.pick(Self::company_prefixes());
            format!("{prefix} {industry} {suffix}")
        } else {
            let family = Self::family_name(rng);
            format!("{family} {industry} {suffix}")
        }
    }

    pub fn position(rng: &mut StreamRng) -> &'static str {
        *rng.pick(Self::positions())
    }

    pub fn senior_position(rng: &mut StreamRng) -> &'static str {
        *rng.pick(Self::senior_positions())
    }

    /// Pick a country uniformly from the EMEA footprint.
    pub fn country(rng: &mut StreamRng) -> &'static Country {
        let idx = rng.next_u64_below(COUNTRIES.len() as u64) as usize;
        &COUNTRIES[idx]
    }

    /// Look up a country by name. Falls back to the first entry so stale
    /// rows in update feeds still get a coherent address.
    pub fn country_by_name(name: &str) -> &'static Country {
        COUNTRIES
            .iter()
            .find(|c| c.name == name)
            .unwrap_or(&COUNTRIES[0])
    }

    /// Generate a street address line within the given country.
    pub fn street_address(rng: &mut StreamRng) -> String {
        let number = rng.int_in(1, 299);
        let street = *rng.pick(Self::street_names());
        let kind = *rng.pick(Self::street_kinds());
        format!("{number} {street} {kind}")
    }

    pub fn city(rng: &mut StreamRng, country: &Country) -> &'static str {
        *rng.pick(country.cities)
    }

    pub fn region(rng: &mut StreamRng, country: &Country) -> &'static str {
        *rng.pick(country.regions)
    }

    pub fn zipcode(rng: &mut StreamRng) -> String {
        format!("{:05}", rng.int_in(1000, 99999))
    }

    // ── Pools ────────────────────────────────────────────────────────────

    fn first_names() -> &'static [&'static str] {
        &[
            "James", "Thomas", "Oliver", "Henry", "Arthur", "Frederik", "Lars", "Magnus",
            "Johan", "Erik", "Nils", "Anders", "Stefan", "Matthias", "Lukas", "Jonas",
            "Felix", "Maximilian", "Pierre", "Antoine", "Julien", "Laurent", "Marco",
            "Luca", "Alessandro", "Giovanni", "Carlos", "Javier", "Miguel", "Diego",
            "Pedro", "Joao", "Piotr", "Jakub", "Tomasz", "Marek", "Willem", "Daan",
            "Sem", "Lucas", "Finn", "Mikkel", "Emil", "Oskar", "Viktor", "Leon",
            "Mary", "Emma", "Charlotte", "Amelia", "Sophie", "Freja", "Ingrid", "Astrid",
            "Sofia", "Elsa", "Greta", "Hanna", "Lena", "Marie", "Camille", "Chloe",
            "Amelie", "Giulia", "Francesca", "Chiara", "Lucia", "Carmen", "Ines",
            "Mariana", "Beatriz", "Agnieszka", "Katarzyna", "Zofia", "Anna", "Eva",
            "Sanne", "Lotte", "Fleur", "Maja", "Ida", "Clara", "Alma", "Nora",
        ]
    }

    fn family_names() -> &'static [&'static str] {
        &[
            "Smith", "Taylor", "Clarke", "Wright", "Walker", "Hansen", "Jensen",
            "Nielsen", "Pedersen", "Larsen", "Andersson", "Johansson", "Karlsson",
            "Lindberg", "Berg", "Haugen", "Dahl", "Mueller", "Schmidt", "Schneider",
            "Fischer", "Weber", "Wagner", "Becker", "Hoffmann", "Martin", "Bernard",
            "Dubois", "Moreau", "Laurent", "Lefebvre", "Rossi", "Russo", "Ferrari",
            "Esposito", "Bianchi", "Romano", "Garcia", "Fernandez", "Lopez",
            "Martinez", "Sanchez", "Silva", "Santos", "Ferreira", "Oliveira",
            "Kowalski", "Nowak", "Wojcik", "Kaminski", "Lewandowski", "Jansen",
            "de Vries", "van den Berg", "Bakker", "Visser", "Virtanen", "Korhonen",
            "Makinen", "Laine",
        ]
    }

    fn company_prefixes() -> &'static [&'static str] {
        &[
            "Nordic", "Continental", "United", "European", "Atlantic", "Premier",
            "Global", "Central", "Meridian", "Alpine", "Baltic", "Crown",
            "Sterling", "Apex", "Vertex", "Horizon",
        ]
    }

    fn industries() -> &'static [&'static str] {
        &[
            "Logistics", "Engineering", "Consulting", "Pharma", "Retail",
            "Shipping", "Energy", "Media", "Software", "Manufacturing",
            "Textiles", "Foods", "Automotive", "Construction", "Insurance",
            "Analytics",
        ]
    }

    fn company_suffixes() -> &'static [&'static str] {
        &[
            "GmbH", "AG", "SA", "SpA", "BV", "AB", "AS", "Ltd", "PLC", "Group",
            "Holdings", "Partners", "International",
        ]
    }

    fn positions() -> &'static [&'static str] {
        &["Analyst", "Manager", "Engineer", "Consultant", "Accountant", "Technician"]
    }

    fn senior_positions() -> &'static [&'static str] {
        &[
            "Senior Analyst", "Director", "Senior Engineer", "Lead Consultant",
            "Head of Operations", "Principal Engineer",
        ]
    }

    fn street_names() -> &'static [&'static str] {
        &[
            "Station", "Church", "Harbour", "Market", "Mill", "Park", "Bridge",
            "Castle", "Garden", "King", "Queen", "North", "South", "Oak", "Birch",
            "Linden", "River", "Meadow", "Orchard", "Windmill",
        ]
    }

    fn street_kinds() -> &'static [&'static str] {
        &["Street", "Road", "Lane", "Avenue", "Square", "Way", "Gate"]
    }
}

/// EMEA footprint with per-country reporting currency. Keep names stable:
/// they appear verbatim in address records and the country-change review
/// flag compares them as strings.
pub const COUNTRIES: &[Country] = &[
    Country {
        name: "United Kingdom",
        currency: "GBP",
        cities: &["London", "Manchester", "Leeds", "Bristol", "Edinburgh"],
        regions: &["Greater London", "Yorkshire", "Midlands", "Scotland"],
    },
    Country {
        name: "Germany",
        currency: "EUR",
        cities: &["Berlin", "Hamburg", "Munich", "Frankfurt", "Cologne"],
        regions: &["Bavaria", "Hesse", "Saxony", "Brandenburg"],
    },
    Country {
        name: "France",
        currency: "EUR",
        cities: &["Paris", "Lyon", "Marseille", "Toulouse", "Nantes"],
        regions: &["Ile-de-France", "Occitanie", "Bretagne", "Provence"],
    },
    Country {
        name: "Italy",
        currency: "EUR",
        cities: &["Rome", "Milan", "Turin", "Bologna", "Naples"],
        regions: &["Lazio", "Lombardy", "Piedmont", "Campania"],
    },
    Country {
        name: "Spain",
        currency: "EUR",
        cities: &["Madrid", "Barcelona", "Valencia", "Seville", "Bilbao"],
        regions: &["Madrid", "Catalonia", "Andalusia", "Basque Country"],
    },
    Country {
        name: "Netherlands",
        currency: "EUR",
        cities: &["Amsterdam", "Rotterdam", "Utrecht", "The Hague", "Eindhoven"],
        regions: &["North Holland", "South Holland", "Utrecht", "Brabant"],
    },
    Country {
        name: "Portugal",
        currency: "EUR",
        cities: &["Lisbon", "Porto", "Braga", "Coimbra"],
        regions: &["Lisbon", "Norte", "Centro", "Algarve"],
    },
    Country {
        name: "Poland",
        currency: "PLN",
        cities: &["Warsaw", "Krakow", "Gdansk", "Wroclaw", "Poznan"],
        regions: &["Mazovia", "Lesser Poland", "Pomerania", "Silesia"],
    },
    Country {
        name: "Sweden",
        currency: "SEK",
        cities: &["Stockholm", "Gothenburg", "Malmo", "Uppsala"],
        regions: &["Stockholm", "Vastra Gotaland", "Skane", "Uppsala"],
    },
    Country {
        name: "Norway",
        currency: "NOK",
        cities: &["Oslo", "Bergen", "Trondheim", "Stavanger"],
        regions: &["Oslo", "Vestland", "Trondelag", "Rogaland"],
    },
    Country {
        name: "Denmark",
        currency: "DKK",
        cities: &["Copenhagen", "Aarhus", "Odense", "Aalborg"],
        regions: &["Capital Region", "Central Jutland", "Southern Denmark"],
    },
    Country {
        name: "Finland",
        currency: "EUR",
        cities: &["Helsinki", "Espoo", "Tampere", "Turku"],
        regions: &["Uusimaa", "Pirkanmaa", "Southwest Finland"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{GeneratorSlot, RngBank};

    #[test]
    fn name_generation_is_deterministic() {
        let bank1 = RngBank::new(12345);
        let mut rng1 = bank1.for_generator(GeneratorSlot::Customer);
        let bank2 = RngBank::new(12345);
        let mut rng2 = bank2.for_generator(GeneratorSlot::Customer);

        for _ in 0..50 {
            assert_eq!(
                NameGenerator::first_name(&mut rng1),
                NameGenerator::first_name(&mut rng2)
            );
        }
    }

    #[test]
    fn addresses_stay_inside_country() {
        let bank = RngBank::new(7);
        let mut rng = bank.for_generator(GeneratorSlot::AddressUpdate);
        for _ in 0..100 {
            let country = NameGenerator::country(&mut rng);
            let city = NameGenerator::city(&mut rng, country);
            assert!(country.cities.contains(&city));
        }
    }

    #[test]
    fn country_lookup_falls_back() {
        assert_eq!(
            NameGenerator::country_by_name("Atlantis").name,
            COUNTRIES[0].name
        );
        assert_eq!(NameGenerator::country_by_name("Poland").currency, "PLN");
    }
}
