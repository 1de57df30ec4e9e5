pub mod io {
    pub mod annotations;
    pub mod bioactivity;
    pub mod cliques;
    pub mod matrix;
    pub mod metadata;
    pub mod mgf;
    pub mod msp;
}

pub mod export;
