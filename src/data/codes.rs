//! Static code tables: IOC codes to continents, ISO codes and flags, plus
//! approximate venue coordinates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Continent label used when a code has no entry in the table.
pub const OTHER_CONTINENT: &str = "Other";

/// Continents a NOC can be grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "South America",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

use Continent::*;

const CONTINENTS: &[(&str, Continent)] = &[
    // Europe
    ("ALB", Europe), ("AND", Europe), ("ARM", Europe), ("AUT", Europe), ("AZE", Europe),
    ("BLR", Europe), ("BEL", Europe), ("BIH", Europe), ("BUL", Europe), ("CRO", Europe),
    ("CYP", Europe), ("CZE", Europe), ("DEN", Europe), ("ESP", Europe), ("EST", Europe),
    ("FIN", Europe), ("FRA", Europe), ("GBR", Europe), ("GEO", Europe), ("GER", Europe),
    ("GRE", Europe), ("HUN", Europe), ("IRL", Europe), ("ISL", Europe), ("ISR", Europe),
    ("ITA", Europe), ("KOS", Europe), ("LAT", Europe), ("LIE", Europe), ("LTU", Europe),
    ("LUX", Europe), ("MDA", Europe), ("MKD", Europe), ("MLT", Europe), ("MNE", Europe),
    ("NED", Europe), ("NOR", Europe), ("POL", Europe), ("POR", Europe), ("ROU", Europe),
    ("SRB", Europe), ("SVK", Europe), ("SLO", Europe), ("SUI", Europe), ("SWE", Europe),
    ("TUR", Europe), ("UKR", Europe), ("SMR", Europe), ("MON", Europe),
    // Asia
    ("AFG", Asia), ("BRN", Asia), ("BAN", Asia), ("BHU", Asia), ("BRU", Asia),
    ("CAM", Asia), ("CHN", Asia), ("TPE", Asia), ("IND", Asia), ("INA", Asia),
    ("IRI", Asia), ("IRQ", Asia), ("JPN", Asia), ("JOR", Asia), ("KAZ", Asia),
    ("KOR", Asia), ("KUW", Asia), ("KGZ", Asia), ("LAO", Asia), ("LBN", Asia),
    ("MAS", Asia), ("MDV", Asia), ("MGL", Asia), ("MYA", Asia), ("NEP", Asia),
    ("OMA", Asia), ("PAK", Asia), ("PLE", Asia), ("PHI", Asia), ("QAT", Asia),
    ("KSA", Asia), ("SGP", Asia), ("SRI", Asia), ("SYR", Asia), ("TJK", Asia),
    ("THA", Asia), ("TLS", Asia), ("TKM", Asia), ("UAE", Asia), ("UZB", Asia),
    ("VIE", Asia), ("YEM", Asia), ("HKG", Asia), ("PRK", Asia),
    // Africa
    ("ALG", Africa), ("ANG", Africa), ("BEN", Africa), ("BOT", Africa), ("BUR", Africa),
    ("BDI", Africa), ("CMR", Africa), ("CPV", Africa), ("CAF", Africa), ("CHA", Africa),
    ("COM", Africa), ("CGO", Africa), ("CIV", Africa), ("COD", Africa), ("DJI", Africa),
    ("EGY", Africa), ("GEQ", Africa), ("ERI", Africa), ("ETH", Africa), ("GAB", Africa),
    ("GAM", Africa), ("GHA", Africa), ("GUI", Africa), ("GBS", Africa), ("KEN", Africa),
    ("LES", Africa), ("LBR", Africa), ("LBA", Africa), ("MAD", Africa), ("MAW", Africa),
    ("MLI", Africa), ("MRI", Africa), ("MAR", Africa), ("MOZ", Africa), ("NAM", Africa),
    ("NIG", Africa), ("NGR", Africa), ("RWA", Africa), ("STP", Africa), ("SEN", Africa),
    ("SEY", Africa), ("SLE", Africa), ("SOM", Africa), ("RSA", Africa), ("SSD", Africa),
    ("SUD", Africa), ("TAN", Africa), ("TOG", Africa), ("TUN", Africa), ("UGA", Africa),
    ("ZAM", Africa), ("ZIM", Africa),
    // North America
    ("ANT", NorthAmerica), ("ARU", NorthAmerica), ("BAH", NorthAmerica), ("BAR", NorthAmerica), ("BIZ", NorthAmerica),
    ("BER", NorthAmerica), ("CAN", NorthAmerica), ("CAY", NorthAmerica), ("CRC", NorthAmerica), ("CUB", NorthAmerica),
    ("DMA", NorthAmerica), ("DOM", NorthAmerica), ("ESA", NorthAmerica), ("GRN", NorthAmerica), ("GUA", NorthAmerica),
    ("HAI", NorthAmerica), ("HON", NorthAmerica), ("JAM", NorthAmerica), ("MEX", NorthAmerica), ("NCA", NorthAmerica),
    ("PAN", NorthAmerica), ("PUR", NorthAmerica), ("SKN", NorthAmerica), ("LCA", NorthAmerica), ("VIN", NorthAmerica),
    ("TTO", NorthAmerica), ("USA", NorthAmerica), ("ISV", NorthAmerica),
    // South America
    ("ARG", SouthAmerica), ("BOL", SouthAmerica), ("BRA", SouthAmerica), ("CHI", SouthAmerica), ("COL", SouthAmerica),
    ("ECU", SouthAmerica), ("GUY", SouthAmerica), ("PAR", SouthAmerica), ("PER", SouthAmerica), ("SUR", SouthAmerica),
    ("URU", SouthAmerica), ("VEN", SouthAmerica),
    // Oceania
    ("ASA", Oceania), ("AUS", Oceania), ("COK", Oceania), ("FIJ", Oceania), ("FSM", Oceania),
    ("GUM", Oceania), ("KIR", Oceania), ("MHL", Oceania), ("NRU", Oceania), ("NZL", Oceania),
    ("PLW", Oceania), ("PNG", Oceania), ("SAM", Oceania), ("SOL", Oceania), ("TGA", Oceania),
    ("TUV", Oceania), ("VAN", Oceania),
];

/// IOC codes whose ISO 3166-1 alpha-3 code differs. Everything else maps to itself.
const IOC_TO_ISO3: &[(&str, &str)] = &[
    ("ALG", "DZA"), ("ANG", "AGO"), ("ANT", "ATG"), ("ARU", "ABW"), ("ASA", "ASM"),
    ("BAH", "BHS"), ("BAN", "BGD"), ("BAR", "BRB"), ("BER", "BMU"), ("BHU", "BTN"),
    ("BIZ", "BLZ"), ("BOT", "BWA"), ("BRN", "BHR"), ("BRU", "BRN"), ("BUL", "BGR"),
    ("BUR", "BFA"), ("CAM", "KHM"), ("CAY", "CYM"), ("CGO", "COG"), ("CHA", "TCD"),
    ("CHI", "CHL"), ("CRC", "CRI"), ("CRO", "HRV"), ("DEN", "DNK"), ("ESA", "SLV"),
    ("FIJ", "FJI"), ("GAM", "GMB"), ("GBS", "GNB"), ("GEQ", "GNQ"), ("GER", "DEU"),
    ("GRE", "GRC"), ("GRN", "GRD"), ("GUA", "GTM"), ("GUI", "GIN"), ("HAI", "HTI"),
    ("HON", "HND"), ("INA", "IDN"), ("IRI", "IRN"), ("ISV", "VIR"), ("IVB", "VGB"),
    ("KOS", "XKX"), ("KSA", "SAU"), ("KUW", "KWT"), ("LAT", "LVA"), ("LBA", "LBY"),
    ("LES", "LSO"), ("MAD", "MDG"), ("MAS", "MYS"), ("MAW", "MWI"), ("MGL", "MNG"),
    ("MON", "MCO"), ("MRI", "MUS"), ("MTN", "MRT"), ("MYA", "MMR"), ("NCA", "NIC"),
    ("NED", "NLD"), ("NEP", "NPL"), ("NGR", "NGA"), ("NIG", "NER"), ("OMA", "OMN"),
    ("PAR", "PRY"), ("PHI", "PHL"), ("PLE", "PSE"), ("POR", "PRT"), ("PUR", "PRI"),
    ("RSA", "ZAF"), ("SAM", "WSM"), ("SEY", "SYC"), ("SKN", "KNA"), ("SLO", "SVN"),
    ("SOL", "SLB"), ("SRI", "LKA"), ("SUD", "SDN"), ("SUI", "CHE"), ("TAN", "TZA"),
    ("TGA", "TON"), ("TOG", "TGO"), ("TPE", "TWN"), ("UAE", "ARE"), ("URU", "URY"),
    ("VAN", "VUT"), ("VIE", "VNM"), ("VIN", "VCT"), ("ZAM", "ZMB"), ("ZIM", "ZWE"),
    ("ROC", "RUS"),
];

const IOC_TO_ISO2: &[(&str, &str)] = &[
    ("AFG", "af"), ("ALB", "al"), ("ALG", "dz"), ("AND", "ad"), ("ANG", "ao"), ("ANT", "ag"),
    ("ARG", "ar"), ("ARM", "am"), ("ARU", "aw"), ("ASA", "as"), ("AUS", "au"), ("AUT", "at"),
    ("AZE", "az"), ("BAH", "bs"), ("BAN", "bd"), ("BAR", "bb"), ("BDI", "bi"), ("BEL", "be"),
    ("BEN", "bj"), ("BER", "bm"), ("BHU", "bt"), ("BIH", "ba"), ("BIZ", "bz"), ("BLR", "by"),
    ("BOL", "bo"), ("BOT", "bw"), ("BRA", "br"), ("BRN", "bh"), ("BRU", "bn"), ("BUL", "bg"),
    ("BUR", "bf"), ("CAF", "cf"), ("CAM", "kh"), ("CAN", "ca"), ("CAY", "ky"), ("CGO", "cg"),
    ("CHA", "td"), ("CHI", "cl"), ("CHN", "cn"), ("CIV", "ci"), ("CMR", "cm"), ("COD", "cd"),
    ("COK", "ck"), ("COL", "co"), ("COM", "km"), ("CPV", "cv"), ("CRC", "cr"), ("CRO", "hr"),
    ("CUB", "cu"), ("CYP", "cy"), ("CZE", "cz"), ("DEN", "dk"), ("DJI", "dj"), ("DMA", "dm"),
    ("DOM", "do"), ("ECU", "ec"), ("EGY", "eg"), ("ERI", "er"), ("ESA", "sv"), ("ESP", "es"),
    ("EST", "ee"), ("ETH", "et"), ("FIJ", "fj"), ("FIN", "fi"), ("FRA", "fr"), ("FSM", "fm"),
    ("GAB", "ga"), ("GAM", "gm"), ("GBR", "gb"), ("GBS", "gw"), ("GEO", "ge"), ("GEQ", "gq"),
    ("GER", "de"), ("GHA", "gh"), ("GRE", "gr"), ("GRN", "gd"), ("GUA", "gt"), ("GUI", "gn"),
    ("GUM", "gu"), ("GUY", "gy"), ("HAI", "ht"), ("HKG", "hk"), ("HON", "hn"), ("HUN", "hu"),
    ("INA", "id"), ("IND", "in"), ("IRI", "ir"), ("IRL", "ie"), ("IRQ", "iq"), ("ISL", "is"),
    ("ISR", "il"), ("ISV", "vi"), ("ITA", "it"), ("IVB", "vg"), ("JAM", "jm"), ("JOR", "jo"),
    ("JPN", "jp"), ("KAZ", "kz"), ("KEN", "ke"), ("KGZ", "kg"), ("KIR", "ki"), ("KOR", "kr"),
    ("KOS", "xk"), ("KSA", "sa"), ("KUW", "kw"), ("LAO", "la"), ("LAT", "lv"), ("LBA", "ly"),
    ("LBN", "lb"), ("LBR", "lr"), ("LCA", "lc"), ("LES", "ls"), ("LIE", "li"), ("LTU", "lt"),
    ("LUX", "lu"), ("MAD", "mg"), ("MAR", "ma"), ("MAS", "my"), ("MAW", "mw"), ("MDA", "md"),
    ("MDV", "mv"), ("MEX", "mx"), ("MGL", "mn"), ("MHL", "mh"), ("MKD", "mk"), ("MLI", "ml"),
    ("MLT", "mt"), ("MNE", "me"), ("MON", "mc"), ("MOZ", "mz"), ("MRI", "mu"), ("MTN", "mr"),
    ("MYA", "mm"), ("NAM", "na"), ("NCA", "ni"), ("NED", "nl"), ("NEP", "np"), ("NGR", "ng"),
    ("NIG", "ne"), ("NOR", "no"), ("NRU", "nr"), ("NZL", "nz"), ("OMA", "om"), ("PAK", "pk"),
    ("PAN", "pa"), ("PAR", "py"), ("PER", "pe"), ("PHI", "ph"), ("PLE", "ps"), ("PLW", "pw"),
    ("PNG", "pg"), ("POL", "pl"), ("POR", "pt"), ("PRK", "kp"), ("PUR", "pr"), ("QAT", "qa"),
    ("ROU", "ro"), ("RSA", "za"), ("RUS", "ru"), ("RWA", "rw"), ("SAM", "ws"), ("SEN", "sn"),
    ("SEY", "sc"), ("SGP", "sg"), ("SKN", "kn"), ("SLE", "sl"), ("SLO", "si"), ("SMR", "sm"),
    ("SOL", "sb"), ("SOM", "so"), ("SRB", "rs"), ("SRI", "lk"), ("SSD", "ss"), ("STP", "st"),
    ("SUD", "sd"), ("SUI", "ch"), ("SUR", "sr"), ("SVK", "sk"), ("SWE", "se"), ("SWZ", "sz"),
    ("SYR", "sy"), ("TAN", "tz"), ("TGA", "to"), ("THA", "th"), ("TJK", "tj"), ("TKM", "tm"),
    ("TLS", "tl"), ("TOG", "tg"), ("TPE", "tw"), ("TTO", "tt"), ("TUN", "tn"), ("TUR", "tr"),
    ("TUV", "tv"), ("UAE", "ae"), ("UGA", "ug"), ("UKR", "ua"), ("URU", "uy"), ("USA", "us"),
    ("UZB", "uz"), ("VAN", "vu"), ("VEN", "ve"), ("VIE", "vn"), ("VIN", "vc"), ("YEM", "ye"),
    ("ZAM", "zm"), ("ZIM", "zw"), ("EOR", "un"), ("ROC", "ru"), ("AIN", "un"),
];

/// Approximate venue coordinates as (latitude, longitude), keyed by the
/// venue names used in the schedule.
const VENUES: &[(&str, f64, f64)] = &[
    ("Aquatics Centre", 48.9244, 2.3600),
    ("Bercy Arena", 48.8386, 2.3785),
    ("Bordeaux Stadium", 44.8969, -0.5639),
    ("Champ de Mars Arena", 48.8530, 2.3012),
    ("Château de Versailles", 48.8049, 2.1204),
    ("Chateauroux Shooting Centre", 46.8115, 1.7534),
    ("Eiffel Tower Stadium", 48.8584, 2.2945),
    ("Elancourt Hill", 48.7708, 1.9667),
    ("Geoffroy-Guichard Stadium", 45.4608, 4.3903),
    ("Grand Palais", 48.8661, 2.3125),
    ("Hôtel de Ville", 48.8566, 2.3522),
    ("Invalides", 48.8622, 2.3125),
    ("La Beaujoire Stadium", 47.2556, -1.5253),
    ("La Concorde", 48.8656, 2.3212),
    ("Le Bourget Sport Climbing Venue", 48.9394, 2.4250),
    ("Golf National", 48.7547, 2.0744),
    ("Lyon Stadium", 45.7653, 4.9820),
    ("Marseille Marina", 43.2700, 5.3692),
    ("Marseille Stadium", 43.2699, 5.3959),
    ("Nice Stadium", 43.7056, 7.1925),
    ("North Paris Arena", 48.9719, 2.4861),
    ("Parc des Princes", 48.8414, 2.2530),
    ("Paris La Defense Arena", 48.8958, 2.2297),
    ("Pierre Mauroy Stadium", 50.6119, 3.1305),
    ("Pont Alexandre III", 48.8639, 2.3136),
    ("Porte de La Chapelle Arena", 48.8994, 2.3611),
    ("Stade Roland-Garros", 48.8473, 2.2494),
    ("Saint-Quentin-en-Yvelines BMX Stadium", 48.7844, 2.0311),
    ("Saint-Quentin-en-Yvelines Velodrome", 48.7844, 2.0311),
    ("South Paris Arena", 48.8322, 2.2856),
    ("Stade de France", 48.9245, 2.3602),
    ("Teahupo'o, Tahiti", -17.8472, -149.2667),
    ("Trocadéro", 48.8616, 2.2893),
    ("Vaires-sur-Marne Nautical Stadium", 48.8625, 2.6378),
    ("Yves-du-Manoir Stadium", 48.9292, 2.2475),
    ("La Chapelle Arena", 48.8994, 2.3611),
    ("South Paris Arena 1", 48.8322, 2.2856),
    ("South Paris Arena 4", 48.8322, 2.2856),
    ("South Paris Arena 6", 48.8322, 2.2856),
    ("Nautical St - Flat water", 48.8625, 2.6378),
    ("Nautical St - White water", 48.8625, 2.6378),
    ("Chateauroux Shooting Ctr", 46.8115, 1.7534),
    ("Champ-de-Mars Arena", 48.8530, 2.3012),
    ("Roland-Garros Stadium", 48.8473, 2.2494),
];

struct CodeTables {
    continents: HashMap<&'static str, Continent>,
    iso3: HashMap<&'static str, &'static str>,
    iso2: HashMap<&'static str, &'static str>,
    venues: HashMap<&'static str, (f64, f64)>,
}

fn tables() -> &'static CodeTables {
    static TABLES: OnceLock<CodeTables> = OnceLock::new();
    TABLES.get_or_init(|| CodeTables {
        continents: CONTINENTS.iter().copied().collect(),
        iso3: IOC_TO_ISO3.iter().copied().collect(),
        iso2: IOC_TO_ISO2.iter().copied().collect(),
        venues: VENUES.iter().map(|&(name, lat, lon)| (name, (lat, lon))).collect(),
    })
}

/// Continent for an IOC code, if the code is known.
pub fn continent(code: &str) -> Option<Continent> {
    tables().continents.get(code).copied()
}

/// Continent label for an IOC code, `"Other"` for unknown codes.
pub fn continent_of(code: &str) -> &'static str {
    continent(code).map(Continent::label).unwrap_or(OTHER_CONTINENT)
}

/// ISO 3166-1 alpha-3 code for an IOC code. Unknown codes are returned as-is.
pub fn iso3_of(code: &str) -> &str {
    tables().iso3.get(code).copied().unwrap_or(code)
}

/// Lowercase ISO alpha-2 code, `"un"` when the code is unknown.
pub fn iso2_of(code: &str) -> &'static str {
    let upper = code.trim().to_ascii_uppercase();
    match upper.len() {
        3 => tables().iso2.get(upper.as_str()).copied().unwrap_or("un"),
        _ => "un",
    }
}

/// Flag image URL on flagcdn.com for an IOC or ISO alpha-2 code.
pub fn flag_url(code: &str, width: u32) -> String {
    let code = code.trim();
    let iso2 = if code.len() == 2 {
        code.to_ascii_lowercase()
    } else {
        iso2_of(code).to_string()
    };
    format!("https://flagcdn.com/w{}/{}.png", width, iso2)
}

/// Coordinates for a venue name, exact match.
pub fn venue_coordinates(name: &str) -> Option<(f64, f64)> {
    tables().venues.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continent_lookup() {
        assert_eq!(continent_of("FRA"), "Europe");
        assert_eq!(continent_of("USA"), "North America");
        assert_eq!(continent_of("NZL"), "Oceania");
        assert_eq!(continent("KEN"), Some(Continent::Africa));
    }

    #[test]
    fn test_unknown_code_falls_back_to_other() {
        assert_eq!(continent_of("EOR"), OTHER_CONTINENT);
        assert_eq!(continent_of("AIN"), OTHER_CONTINENT);
        assert_eq!(continent_of(""), OTHER_CONTINENT);
    }

    #[test]
    fn test_iso3_mapping() {
        assert_eq!(iso3_of("GER"), "DEU");
        assert_eq!(iso3_of("SUI"), "CHE");
        assert_eq!(iso3_of("USA"), "USA");
        assert_eq!(iso3_of("XYZ"), "XYZ");
    }

    #[test]
    fn test_flag_url() {
        assert_eq!(flag_url("GER", 20), "https://flagcdn.com/w20/de.png");
        assert_eq!(flag_url("fr", 40), "https://flagcdn.com/w40/fr.png");
        assert_eq!(flag_url("", 20), "https://flagcdn.com/w20/un.png");
        assert_eq!(flag_url("EOR", 20), "https://flagcdn.com/w20/un.png");
    }

    #[test]
    fn test_venue_coordinates() {
        assert_eq!(venue_coordinates("Stade de France"), Some((48.9245, 2.3602)));
        assert!(venue_coordinates("Unknown Venue").is_none());
    }

    #[test]
    fn test_every_table_entry_is_a_three_letter_code() {
        assert!(CONTINENTS.iter().all(|(code, _)| code.len() == 3));
        assert!(IOC_TO_ISO3.iter().all(|(a, b)| a.len() == 3 && b.len() == 3));
    }
}
