#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const PROFILES: &str = r#"[
    {"id": 1, "name": "Aquali", "stats": {"hp": 130, "attack": 65, "defense": 60, "sp_attack": 110, "sp_defense": 95, "speed": 65}, "types": ["Eau"]},
    {"id": 2, "name": "Pyroli", "stats": {"hp": 65, "attack": 130, "defense": 60, "sp_attack": 95, "sp_defense": 110, "speed": 65}, "types": ["Feu"]},
    {"id": 3, "name": "Voltali", "stats": {"hp": 65, "attack": 65, "defense": 60, "sp_attack": 110, "sp_defense": 95, "speed": 130}, "types": ["Électrik"]},
    {"id": 4, "name": "Phyllali", "stats": {"hp": 65, "attack": 110, "defense": 130, "sp_attack": 60, "sp_defense": 65, "speed": 95}, "types": ["Plante"]},
    {"id": 5, "name": "Roucarnage", "stats": {"hp": 83, "attack": 80, "defense": 75, "sp_attack": 70, "sp_defense": 70, "speed": 101}, "types": ["Normal", "Vol"]}
]"#;

pub const MOVES: &str = r#"{
    "moves": [
        {"name": "Surf", "type": "Eau", "category": "special", "power": 90},
        {"name": "Hydrocanon", "type": "Eau", "category": "special", "power": 110, "accuracy": 80},
        {"name": "Lance-Flammes", "type": "Feu", "category": "special", "power": 90},
        {"name": "Boutefeu", "type": "Feu", "category": "physical", "power": 120, "damage_type": "offensif"},
        {"name": "Tonnerre", "type": "Électrik", "category": "special", "power": 90},
        {"name": "Vive-Attaque", "type": "Normal", "category": "physical", "power": 40, "priority": 1, "damage_type": "prioritaire"},
        {"name": "Lame-Feuille", "type": "Plante", "category": "physical", "power": 90},
        {"name": "Double Pied", "type": "Combat", "category": "physical", "power": 30, "damage_type": "multi_coups"},
        {"name": "Vol", "type": "Vol", "category": "physical", "power": 90, "damage_type": "deux_tours"},
        {"name": "Frappe Atlas", "type": "Combat", "category": "physical", "power": 1, "damage_type": "fixe_niveau"},
        {"name": "Bluff", "type": "Normal", "category": "physical", "power": 40, "priority": 3},
        {"name": "Rugissement", "type": "Normal", "category": "status"}
    ],
    "movesets": {
        "1": ["Surf", "Hydrocanon", "Vive-Attaque", "Rugissement"],
        "2": ["Lance-Flammes", "Boutefeu", "Vive-Attaque", "Bluff"],
        "3": ["Tonnerre", "Vive-Attaque", "Double Pied"],
        "4": ["Lame-Feuille", "Vive-Attaque", "Frappe Atlas"],
        "5": ["Vol", "Vive-Attaque"]
    }
}"#;

pub const TYPE_CHART: &str = r#"[
    {"attacking": "Eau", "defending": "Feu", "multiplier": 2.0},
    {"attacking": "Eau", "defending": "Eau", "multiplier": 0.5},
    {"attacking": "Eau", "defending": "Plante", "multiplier": 0.5},
    {"attacking": "Feu", "defending": "Plante", "multiplier": 2.0},
    {"attacking": "Feu", "defending": "Eau", "multiplier": 0.5},
    {"attacking": "Feu", "defending": "Feu", "multiplier": 0.5},
    {"attacking": "Électrik", "defending": "Eau", "multiplier": 2.0},
    {"attacking": "Électrik", "defending": "Vol", "multiplier": 2.0},
    {"attacking": "Électrik", "defending": "Plante", "multiplier": 0.5},
    {"attacking": "Plante", "defending": "Eau", "multiplier": 2.0},
    {"attacking": "Plante", "defending": "Feu", "multiplier": 0.5},
    {"attacking": "Plante", "defending": "Vol", "multiplier": 0.5},
    {"attacking": "Combat", "defending": "Normal", "multiplier": 2.0},
    {"attacking": "Combat", "defending": "Vol", "multiplier": 0.5},
    {"attacking": "Vol", "defending": "Plante", "multiplier": 2.0},
    {"attacking": "Vol", "defending": "Électrik", "multiplier": 0.5}
]"#;

/// Writes the sample roster into `dir`
pub fn write_data_dir(dir: &Path) {
    fs::write(dir.join("profiles.json"), PROFILES).unwrap();
    fs::write(dir.join("moves.json"), MOVES).unwrap();
    fs::write(dir.join("type_chart.json"), TYPE_CHART).unwrap();
}
