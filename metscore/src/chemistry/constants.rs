// Purpose: To store mass constants that are used for ion identity assignment
pub const MASS_PROTON: f64 = 1.007276; // Unified atomic mass unit
pub const MASS_SODIUM: f64 = 22.989218; // Unified atomic mass unit
pub const MASS_C13_C12_DELTA: f64 = 1.0033548; // Mass shift per C13 substitution
pub const MASS_IRON_56: f64 = 55.934940; // Unified atomic mass unit
pub const MASS_AMMONIUM: f64 = 17.026547; // Unified atomic mass unit
pub const MASS_POTASSIUM_MINUS_PROTON: f64 = 37.955882; // K adduct shift relative to [M+H]+
pub const MASS_WATER: f64 = 18.010565; // Unified atomic mass unit

// Parts-per-million scale factor
pub const PPM: f64 = 1e6;
