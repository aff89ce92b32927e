//! Static winery reference data.
//!
//! Wines refer to a winery by key only. The table is fixed at compile time and
//! is not user data.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Winery {
  pub key:  &'static str,
  pub name: &'static str,
}

const fn winery(key: &'static str, name: &'static str) -> Winery {
  Winery { key, name }
}

pub const WINERIES: &[Winery] = &[
  winery("antinori", "Marchesi Antinori"),
  winery("beringer", "Beringer Vineyards"),
  winery("cakebread", "Cakebread Cellars"),
  winery("catena", "Bodega Catena Zapata"),
  winery("chateau-margaux", "Château Margaux"),
  winery("chateau-ste-michelle", "Chateau Ste. Michelle"),
  winery("cloudy-bay", "Cloudy Bay"),
  winery("concha-y-toro", "Concha y Toro"),
  winery("domaine-ott", "Domaine Ott"),
  winery("duckhorn", "Duckhorn Vineyards"),
  winery("e-guigal", "E. Guigal"),
  winery("penfolds", "Penfolds"),
  winery("ridge", "Ridge Vineyards"),
  winery("robert-mondavi", "Robert Mondavi Winery"),
  winery("santa-margherita", "Santa Margherita"),
  winery("stags-leap", "Stag's Leap Wine Cellars"),
  winery("torres", "Familia Torres"),
  winery("vega-sicilia", "Vega Sicilia"),
  winery("whispering-angel", "Château d'Esclans"),
  winery("other", "Other"),
];
