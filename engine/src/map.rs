// ═══════════════════════════════════════════════════════════════════════
// Map graph — countries, continents, adjacency and the connectivity
// validator. Also hosts the builtin maps used by tests and tournaments.
//
// Invariants enforced by the mutators:
//   I1  adjacency is symmetric
// Invariants checked by `validate()`:
//   I2  the whole country graph is connected
//   I3  every continent's induced subgraph is connected
// ═══════════════════════════════════════════════════════════════════════

use crate::error::EngineError;
use crate::navigation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Ids ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CountryId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ContinentId(pub u32);

// ── Country / Continent ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub continent: ContinentId,
    pub neighbors: BTreeSet<CountryId>,
    pub armies: u32,
    /// Owning player name. `None` only before countries are assigned.
    pub owner: Option<String>,
}

impl Country {
    pub fn is_owned_by(&self, player: &str) -> bool {
        self.owner.as_deref() == Some(player)
    }
}

/// Member countries are derived from `Country::continent`, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub id: ContinentId,
    pub name: String,
    pub bonus: u32,
}

// ── MapGraph ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGraph {
    pub name: String,
    countries: Vec<Country>,
    continents: Vec<Continent>,
    next_country_id: u32,
    next_continent_id: u32,
}

impl MapGraph {
    pub fn new(name: impl Into<String>) -> Self {
        MapGraph { name: name.into(), ..Default::default() }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn continents(&self) -> &[Continent] {
        &self.continents
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.countries.iter().find(|c| c.id == id)
    }

    pub fn country_mut(&mut self, id: CountryId) -> Option<&mut Country> {
        self.countries.iter_mut().find(|c| c.id == id)
    }

    pub fn country_by_name(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Name of a country, or `#<id>` if it does not exist.
    pub fn country_name(&self, id: CountryId) -> String {
        self.country(id).map_or_else(|| format!("#{}", id.0), |c| c.name.clone())
    }

    pub fn continent(&self, id: ContinentId) -> Option<&Continent> {
        self.continents.iter().find(|c| c.id == id)
    }

    pub fn continent_by_name(&self, name: &str) -> Option<&Continent> {
        self.continents.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn continent_members(&self, id: ContinentId) -> Vec<CountryId> {
        self.countries.iter().filter(|c| c.continent == id).map(|c| c.id).collect()
    }

    pub fn are_adjacent(&self, a: CountryId, b: CountryId) -> bool {
        self.country(a).is_some_and(|c| c.neighbors.contains(&b))
    }

    // ── Mutators (map editor) ──────────────────────────────────────────

    pub fn add_continent(&mut self, name: &str, bonus: u32) -> Result<ContinentId, EngineError> {
        if self.continent_by_name(name).is_some() {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        let id = ContinentId(self.next_continent_id);
        self.next_continent_id += 1;
        self.continents.push(Continent { id, name: name.to_string(), bonus });
        Ok(id)
    }

    /// Removes the continent together with all of its countries.
    pub fn remove_continent(&mut self, name: &str) -> Result<(), EngineError> {
        let id = self
            .continent_by_name(name)
            .map(|c| c.id)
            .ok_or_else(|| EngineError::UnknownContinent(name.to_string()))?;
        for member in self.continent_members(id) {
            self.detach(member);
        }
        self.countries.retain(|c| c.continent != id);
        self.continents.retain(|c| c.id != id);
        Ok(())
    }

    pub fn add_country(&mut self, name: &str, continent: &str) -> Result<CountryId, EngineError> {
        if self.country_by_name(name).is_some() {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        let continent_id = self
            .continent_by_name(continent)
            .map(|c| c.id)
            .ok_or_else(|| EngineError::UnknownContinent(continent.to_string()))?;
        let id = CountryId(self.next_country_id);
        self.next_country_id += 1;
        self.countries.push(Country {
            id,
            name: name.to_string(),
            continent: continent_id,
            neighbors: BTreeSet::new(),
            armies: 0,
            owner: None,
        });
        Ok(id)
    }

    pub fn remove_country(&mut self, name: &str) -> Result<(), EngineError> {
        let id = self.lookup(name)?;
        self.detach(id);
        self.countries.retain(|c| c.id != id);
        Ok(())
    }

    /// Adds an undirected edge. Adding an existing edge is a no-op.
    pub fn add_neighbor(&mut self, a: &str, b: &str) -> Result<(), EngineError> {
        let (a, b) = (self.lookup(a)?, self.lookup(b)?);
        self.connect(a, b)
    }

    pub fn remove_neighbor(&mut self, a: &str, b: &str) -> Result<(), EngineError> {
        let (a, b) = (self.lookup(a)?, self.lookup(b)?);
        if let Some(c) = self.country_mut(a) {
            c.neighbors.remove(&b);
        }
        if let Some(c) = self.country_mut(b) {
            c.neighbors.remove(&a);
        }
        Ok(())
    }

    pub fn connect(&mut self, a: CountryId, b: CountryId) -> Result<(), EngineError> {
        if a == b {
            return Err(EngineError::IllegalArgument(format!(
                "country '{}' cannot neighbor itself",
                self.country_name(a)
            )));
        }
        if self.country(a).is_none() {
            return Err(EngineError::UnknownCountry(format!("#{}", a.0)));
        }
        if self.country(b).is_none() {
            return Err(EngineError::UnknownCountry(format!("#{}", b.0)));
        }
        if let Some(c) = self.country_mut(a) {
            c.neighbors.insert(b);
        }
        if let Some(c) = self.country_mut(b) {
            c.neighbors.insert(a);
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<CountryId, EngineError> {
        self.country_by_name(name)
            .map(|c| c.id)
            .ok_or_else(|| EngineError::UnknownCountry(name.to_string()))
    }

    /// Drop every edge touching `id`.
    fn detach(&mut self, id: CountryId) {
        for c in &mut self.countries {
            c.neighbors.remove(&id);
        }
        if let Some(c) = self.country_mut(id) {
            c.neighbors.clear();
        }
    }

    // ── Validation ─────────────────────────────────────────────────────

    /// Validate from the first country.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self.countries.first() {
            Some(first) => self.validate_from(first.id),
            None => Err(EngineError::MapInvalid("map has no countries".into())),
        }
    }

    /// Validate with the whole-map traversal starting at `start`.
    /// The verdict does not depend on the start node.
    pub fn validate_from(&self, start: CountryId) -> Result<(), EngineError> {
        if self.countries.is_empty() {
            return Err(EngineError::MapInvalid("map has no countries".into()));
        }
        if self.country(start).is_none() {
            return Err(EngineError::UnknownCountry(format!("#{}", start.0)));
        }

        for c in &self.countries {
            if self.continent(c.continent).is_none() {
                return Err(EngineError::MapInvalid(format!(
                    "country '{}' references an unknown continent",
                    c.name
                )));
            }
            for &n in &c.neighbors {
                if !self.are_adjacent(n, c.id) {
                    return Err(EngineError::MapInvalid(format!(
                        "adjacency between '{}' and '{}' is not symmetric",
                        c.name,
                        self.country_name(n)
                    )));
                }
            }
        }

        let reached = navigation::reachable(self, start, |_| true);
        if reached.len() != self.countries.len() {
            return Err(EngineError::MapInvalid(format!(
                "map is not connected: {} of {} countries reachable from '{}'",
                reached.len(),
                self.countries.len(),
                self.country_name(start)
            )));
        }

        for continent in &self.continents {
            let members = self.continent_members(continent.id);
            let Some(&first) = members.first() else {
                return Err(EngineError::MapInvalid(format!(
                    "continent '{}' has no countries",
                    continent.name
                )));
            };
            let reached = navigation::reachable(self, first, |c| c.continent == continent.id);
            if reached.len() != members.len() {
                return Err(EngineError::MapInvalid(format!(
                    "continent '{}' is not connected: {} of {} countries reachable",
                    continent.name,
                    reached.len(),
                    members.len()
                )));
            }
        }

        Ok(())
    }
}

// ── Builtin maps ───────────────────────────────────────────────────────

pub const BUILTIN_MAPS: [&str; 3] = ["tiny", "classic", "islands"];

/// Static description of one builtin country.
struct CountryDef {
    name: &'static str,
    continent: &'static str,
    adjacent: &'static [&'static str],
}

macro_rules! country {
    ($name:expr, in $cont:expr, adj: [$($a:expr),*]) => {
        CountryDef { name: $name, continent: $cont, adjacent: &[$($a),*] }
    };
}

// Two continents joined by a single bridge (C–D).
static TINY_CONTINENTS: [(&str, u32); 2] = [("West", 2), ("East", 2)];
static TINY: [CountryDef; 6] = [
    country!("A", in "West", adj: ["B", "C"]),
    country!("B", in "West", adj: ["A", "C"]),
    country!("C", in "West", adj: ["A", "B", "D"]),
    country!("D", in "East", adj: ["C", "E", "F"]),
    country!("E", in "East", adj: ["D", "F"]),
    country!("F", in "East", adj: ["D", "E"]),
];

// Two triangles with no bridge: fails I2.
static ISLANDS_CONTINENTS: [(&str, u32); 2] = [("North", 1), ("South", 1)];
static ISLANDS: [CountryDef; 6] = [
    country!("N1", in "North", adj: ["N2", "N3"]),
    country!("N2", in "North", adj: ["N1", "N3"]),
    country!("N3", in "North", adj: ["N1", "N2"]),
    country!("S1", in "South", adj: ["S2", "S3"]),
    country!("S2", in "South", adj: ["S1", "S3"]),
    country!("S3", in "South", adj: ["S1", "S2"]),
];

static CLASSIC_CONTINENTS: [(&str, u32); 5] = [
    ("Northland", 3),
    ("Westmarch", 2),
    ("Heartland", 5),
    ("Eastreach", 3),
    ("Southsea", 2),
];
static CLASSIC: [CountryDef; 20] = [
    // Northland
    country!("Frosthold", in "Northland", adj: ["Icegate", "Pinecrest"]),
    country!("Icegate", in "Northland", adj: ["Frosthold", "Pinecrest", "Snowfield"]),
    country!("Pinecrest", in "Northland", adj: ["Frosthold", "Icegate", "Snowfield", "Greyfen"]),
    country!("Snowfield", in "Northland", adj: ["Icegate", "Pinecrest", "Ironwood"]),
    // Westmarch
    country!("Greyfen", in "Westmarch", adj: ["Pinecrest", "Saltmarsh", "Redcliff"]),
    country!("Saltmarsh", in "Westmarch", adj: ["Greyfen", "Redcliff", "Harbor"]),
    country!("Redcliff", in "Westmarch", adj: ["Greyfen", "Saltmarsh", "Crossroads"]),
    // Heartland
    country!("Crossroads", in "Heartland", adj: ["Redcliff", "Kingsmere", "Highfield", "Ironwood"]),
    country!("Kingsmere", in "Heartland", adj: ["Crossroads", "Highfield", "Stonebridge"]),
    country!("Highfield", in "Heartland", adj: ["Crossroads", "Kingsmere", "Stonebridge", "Dunmoor"]),
    country!("Stonebridge", in "Heartland", adj: ["Kingsmere", "Highfield", "Ambercoast"]),
    country!("Ironwood", in "Heartland", adj: ["Snowfield", "Crossroads", "Duskvale"]),
    // Eastreach
    country!("Duskvale", in "Eastreach", adj: ["Ironwood", "Sunspire", "Emberpeak"]),
    country!("Sunspire", in "Eastreach", adj: ["Duskvale", "Emberpeak"]),
    country!("Emberpeak", in "Eastreach", adj: ["Duskvale", "Sunspire", "Ambercoast"]),
    // Southsea
    country!("Harbor", in "Southsea", adj: ["Saltmarsh", "Dunmoor"]),
    country!("Dunmoor", in "Southsea", adj: ["Harbor", "Highfield", "Coralbay"]),
    country!("Coralbay", in "Southsea", adj: ["Dunmoor", "Ambercoast", "Reefwatch"]),
    country!("Ambercoast", in "Southsea", adj: ["Coralbay", "Stonebridge", "Emberpeak", "Reefwatch"]),
    country!("Reefwatch", in "Southsea", adj: ["Coralbay", "Ambercoast"]),
];

fn build(name: &str, continents: &[(&str, u32)], countries: &[CountryDef]) -> Result<MapGraph, EngineError> {
    let mut map = MapGraph::new(name);
    for &(continent, bonus) in continents {
        map.add_continent(continent, bonus)?;
    }
    for def in countries {
        map.add_country(def.name, def.continent)?;
    }
    for def in countries {
        for adj in def.adjacent {
            map.add_neighbor(def.name, adj)?;
        }
    }
    Ok(map)
}

/// Build one of the builtin maps by name. The result is not validated.
pub fn builtin(name: &str) -> Result<MapGraph, EngineError> {
    match name {
        "tiny" => build(name, &TINY_CONTINENTS, &TINY),
        "classic" => build(name, &CLASSIC_CONTINENTS, &CLASSIC),
        "islands" => build(name, &ISLANDS_CONTINENTS, &ISLANDS),
        other => Err(EngineError::IllegalArgument(format!("no builtin map named '{}'", other))),
    }
}
