use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::BarcodeRecord;

/// Phyla known per kingdom. The lists are deliberately generous and include
/// some non-phylum ranks; a phylum may sit under more than one kingdom
/// (`Microsporidia` is listed under both Protozoa and Fungi).
const KINGDOM_PHYLA: &[(&str, &[&str])] = &[
    (
        "Bacteria",
        &[
            "Acidobacteria",
            "Actinobacteria",
            "Aquificae",
            "Armatimonadetes",
            "Bacteroidetes",
            "Caldiserica",
            "Chlamydiae",
            "Chlorobi",
            "Chloroflexi",
            "Chrysiogenetes",
            "Coprothermobacterota",
            "Cyanobacteria",
            "Deferribacteres",
            "Deinococcus-Thermus",
            "Dictyoglomi",
            "Elusimicrobia",
            "Fibrobacteres",
            "Firmicutes",
            "Fusobacteria",
            "Gemmatimonadetes",
            "Lentisphaerae",
            "Nitrospirae",
            "Planctomycetes",
            "Proteobacteria",
            "Spirochaetes",
            "Synergistetes",
            "Tenericutes",
            "Thermodesulfobacteria",
            "Thermotogae",
            "Verrucomicrobia",
        ],
    ),
    (
        "Archaea",
        &[
            "Euryarchaeota",
            "Methanopyri",
            "Methanococci",
            "Eurythermea",
            "Neobacteria",
            "DPANN",
            "ARMAN",
            "Micrarchaeota",
            "Parvarchaeota",
            "Aenigmarchaeota",
            "Diapherotrites",
            "Nanoarchaeota",
            "Nanohaloarchaeota",
            "Pacearchaeota",
            "Woesearchaeota",
            "Proteoarchaeota",
            "TACK",
            "Filarchaeota",
            "Aigarchaeota",
            "Bathyarchaeota",
            "Crenarchaeota",
            "Geoarchaeota",
            "Korarchaeota",
            "Thaumarchaeota",
            "Asgardarchaeota",
            "Lokiarchaeota",
            "Thorarchaeota",
            "Odinarchaeota",
            "Heimdallarchaeota",
        ],
    ),
    (
        "Protozoa",
        &[
            "Euglenozoa",
            "Amoebozoa",
            "Metamonada",
            "Choanozoa",
            "Loukozoa",
            "Percolozoa",
            "Microsporidia",
            "Sulcozoa",
        ],
    ),
    (
        "Chromista",
        &[
            "Corbihelia",
            "Cryptophyta",
            "Centroheliozoa",
            "Haptophyta",
            "Filosa",
            "Retaria",
            "Ciliophora",
            "Miozoa",
            "Platysulcea",
            "Sagenista",
            "Placidozoa",
            "Bigyromonadea",
            "Peronosporomycota",
            "Hyphochytriomycota",
            "Pirsonea",
            "Ochrophyta",
        ],
    ),
    (
        "Plantae",
        &[
            "Chlorokybophyta",
            "Mesostigmatophyta",
            "Spirotaenia",
            "Chlorobionta",
            "Chlorophyta",
            "Streptobionta",
            "Klebsormidiophyceae",
            "Charophyta",
            "Chaetosphaeridiales",
            "Coleochaetophyta",
            "Zygnematophyta",
            "Embryophyta",
            "Marchantiophyta",
            "Bryophyta",
            "Anthocerotophyta",
            "Horneophyta",
            "Aglaophyta",
            "Tracheophyta",
        ],
    ),
    (
        "Fungi",
        &[
            "Rozellomyceta",
            "Rozellomycota",
            "Microsporidia",
            "Aphelidiomyceta",
            "Aphelidiomycota",
            "Eumycota",
            "Chytridiomyceta",
            "Neocallimastigomycota",
            "Chytridiomycota",
            "Blastocladiomyceta",
            "Blastocladiomycota",
            "Zoopagomyceta",
            "Basidiobolomycota",
            "Entomophthoromycota",
            "Kickxellomycota",
            "Mortierellomycota",
            "Mucoromyceta",
            "Calcarisporiellomycota",
            "Mucoromycota",
            "Symbiomycota",
            "Glomeromycota",
            "Entorrhizomycota",
            "Dikarya",
            "Basidiomycota",
            "Ascomycota",
        ],
    ),
    (
        "Animalia",
        &[
            "Acanthocephala",
            "Annelida",
            "Arthropoda",
            "Brachiopoda",
            "Bryozoa",
            "Chaetognatha",
            "Chordata",
            "Cnidaria",
            "Ctenophora",
            "Cycliophora",
            "Echinodermata",
            "Entoprocta",
            "Gastrotricha",
            "Gnathostomulida",
            "Hemichordata",
            "Kinorhyncha",
            "Loricifera",
            "Micrognathozoa",
            "Mollusca",
            "Nematoda",
            "Nematomorpha",
            "Nemertea",
            "Onychophora",
            "Orthonectida",
            "Phoronida",
            "Placozoa",
            "Platyhelminthes",
            "Porifera",
            "Priapulida",
            "Rhombozoa",
            "Rotifera",
            "Sipuncula",
            "Tardigrada",
            "Xenacoelomorpha",
        ],
    ),
];

/// Immutable kingdom → phyla reference used for kingdom inference.
#[derive(Debug, Clone)]
pub struct KingdomTable {
    kingdoms: BTreeMap<&'static str, BTreeSet<&'static str>>,
}

impl Default for KingdomTable {
    fn default() -> Self {
        Self {
            kingdoms: KINGDOM_PHYLA
                .iter()
                .map(|(kingdom, phyla)| (*kingdom, phyla.iter().copied().collect()))
                .collect(),
        }
    }
}

impl KingdomTable {
    pub fn kingdom_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kingdoms.keys().copied()
    }

    pub fn kingdoms_for(&self, phylum: &str) -> Vec<&'static str> {
        self.kingdoms
            .iter()
            .filter(|(_, phyla)| phyla.contains(phylum))
            .map(|(kingdom, _)| *kingdom)
            .collect()
    }

    /// The single kingdom listing `phylum`, or `""` when none or several do.
    pub fn infer(&self, phylum: &str) -> &'static str {
        match self.kingdoms_for(phylum).as_slice() {
            [kingdom] => *kingdom,
            _ => "",
        }
    }
}

/// Assigns kingdoms and builds lineage strings for cleaned records.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    reference: &'a KingdomTable,
    kingdom_override: Option<String>,
}

impl<'a> Classifier<'a> {
    pub fn new(reference: &'a KingdomTable, kingdom_override: Option<String>) -> Self {
        Self {
            reference,
            kingdom_override,
        }
    }

    pub fn kingdom_for(&self, record: &BarcodeRecord) -> String {
        match &self.kingdom_override {
            Some(kingdom) => kingdom.clone(),
            None => self.reference.infer(&record.phylum_name).to_string(),
        }
    }

    pub fn lineage(&self, record: &BarcodeRecord) -> Lineage {
        Lineage {
            kingdom: self.kingdom_for(record),
            phylum: record.phylum_name.clone(),
            class: record.class_name.clone(),
            order: record.order_name.clone(),
            family: record.family_name.clone(),
            genus: record.genus_name.clone(),
            species: record.species_name.clone(),
        }
    }
}

/// Seven-rank label rendered as
/// `k__..; p__..; c__..; o__..; f__..; g__..; s__..`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    pub kingdom: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k__{}; p__{}; c__{}; o__{}; f__{}; g__{}; s__{}",
            self.kingdom,
            self.phylum,
            self.class,
            self.order,
            self.family,
            self.genus,
            self.species
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kingdom_is_loaded() {
        let table = KingdomTable::default();
        assert_eq!(table.kingdom_names().count(), 7);
    }

    #[test]
    fn unknown_phylum_infers_nothing() {
        let table = KingdomTable::default();
        assert_eq!(table.infer("Notaphylum"), "");
        assert_eq!(table.infer(""), "");
    }

    #[test]
    fn overlap_is_reported_by_kingdoms_for() {
        let table = KingdomTable::default();
        assert_eq!(table.kingdoms_for("Microsporidia"), vec!["Fungi", "Protozoa"]);
    }

    #[test]
    fn empty_lineage_keeps_prefixes() {
        assert_eq!(
            Lineage::default().to_string(),
            "k__; p__; c__; o__; f__; g__; s__"
        );
    }
}
