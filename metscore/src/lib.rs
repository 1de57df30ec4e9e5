// chemistry module
pub mod chemistry {
    pub mod constants;
    pub mod adducts;
}

// algorithm module
pub mod algorithm {
    pub mod overlap;
    pub mod similarity;
    pub mod novelty;
}

// data module
pub mod data {
    pub mod matrix;
    pub mod peak;
    pub mod spectrum;
    pub mod feature;
    pub mod clique;
    pub mod stats;
}

// pipeline module
pub mod pipeline {
    pub mod config;
    pub mod stats;
    pub mod tables;
    pub mod aggregate;
    pub mod blank;
    pub mod bioactivity;
    pub mod cliques;
    pub mod library;
    pub mod selection;
    pub mod rollup;
    pub mod run;
}
