//! Polylinie (Weg) als geordnete Folge von Vertex-IDs und abgeleitete Kanten.

/// Logische Kante: Abschnitt zwischen `index` und `index + 1` einer Polylinie.
///
/// Wird nicht gespeichert, sondern bei Bedarf abgeleitet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    /// ID der Polylinie
    pub polyline_id: u64,
    /// Index des ersten Endpunkts
    pub index: usize,
}

impl EdgeRef {
    /// Erstellt eine Kanten-Referenz
    pub fn new(polyline_id: u64, index: usize) -> Self {
        Self { polyline_id, index }
    }

    /// Index, an dem ein neuer Vertex in die Kante eingefügt wird
    pub fn upper_index(&self) -> usize {
        self.index + 1
    }
}

/// Prüft ob zwei Endpunkt-Paare dieselbe physische Kante beschreiben (ungeordnet).
pub fn same_edge(a: (u64, u64), b: (u64, u64)) -> bool {
    (a.0 == b.0 && a.1 == b.1) || (a.0 == b.1 && a.1 == b.0)
}

/// Geordnete Folge von Vertex-Referenzen.
///
/// Besitzt keine Vertices; geschlossen, wenn erster und letzter Eintrag identisch sind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polyline {
    /// Eindeutige ID
    pub id: u64,
    vertex_ids: Vec<u64>,
}

impl Polyline {
    /// Erstellt eine Polylinie aus der gegebenen Vertex-Folge
    pub fn new(id: u64, vertex_ids: Vec<u64>) -> Self {
        Self { id, vertex_ids }
    }

    /// Read-only Sicht auf die Vertex-Folge
    pub fn vertex_ids(&self) -> &[u64] {
        &self.vertex_ids
    }

    /// Ersetzt die Vertex-Folge
    pub(crate) fn set_vertex_ids(&mut self, vertex_ids: Vec<u64>) {
        self.vertex_ids = vertex_ids;
    }

    /// Anzahl der Einträge (inkl. doppeltem Schluss-Vertex)
    pub fn len(&self) -> usize {
        self.vertex_ids.len()
    }

    /// Gibt `true` zurück, wenn die Folge leer ist.
    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    /// Geschlossen: mindestens 3 Einträge und erster == letzter
    pub fn is_closed(&self) -> bool {
        self.vertex_ids.len() >= 3 && self.vertex_ids.first() == self.vertex_ids.last()
    }

    /// Einträge ohne doppelten Schluss-Vertex
    pub fn distinct_ids(&self) -> &[u64] {
        if self.is_closed() {
            &self.vertex_ids[..self.vertex_ids.len() - 1]
        } else {
            &self.vertex_ids
        }
    }

    /// Anzahl der unterschiedlichen Positionen (Basis für Index-Arithmetik)
    pub fn real_vertex_count(&self) -> usize {
        self.distinct_ids().len()
    }

    /// Vertex-ID an einem Index
    pub fn vertex_at(&self, index: usize) -> Option<u64> {
        self.vertex_ids.get(index).copied()
    }

    /// Erster Index, an dem der Vertex vorkommt
    pub fn index_of(&self, vertex_id: u64) -> Option<usize> {
        self.vertex_ids.iter().position(|&id| id == vertex_id)
    }

    /// Prüft ob der Vertex referenziert wird
    pub fn contains(&self, vertex_id: u64) -> bool {
        self.vertex_ids.contains(&vertex_id)
    }

    /// Vorkommen des Vertex; der Schluss-Vertex zählt nur einmal
    pub fn occurrences(&self, vertex_id: u64) -> usize {
        self.distinct_ids()
            .iter()
            .filter(|&&id| id == vertex_id)
            .count()
    }

    /// Alle benachbarten Vertex-Paare in Reihenfolge (inkl. Schluss-Kante)
    pub fn node_pairs(&self) -> Vec<(u64, u64)> {
        self.vertex_ids.windows(2).map(|w| (w[0], w[1])).collect()
    }

    /// Endpunkte der Kante an `index`
    pub fn edge_endpoints(&self, index: usize) -> Option<(u64, u64)> {
        Some((self.vertex_at(index)?, self.vertex_at(index + 1)?))
    }

    /// Alle Indizes, an denen die Kante (a, b) in beliebiger Richtung vorkommt
    pub fn edge_indices(&self, a: u64, b: u64) -> Vec<usize> {
        self.node_pairs()
            .into_iter()
            .enumerate()
            .filter(|(_, pair)| same_edge(*pair, (a, b)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Neue Folge mit eingefügtem Vertex an `index`
    pub fn with_vertex_inserted(&self, index: usize, vertex_id: u64) -> Vec<u64> {
        let mut ids = self.vertex_ids.clone();
        ids.insert(index.min(ids.len()), vertex_id);
        ids
    }

    /// Neue Folge ohne den Vertex.
    ///
    /// Alle Vorkommen werden entfernt, entstehende direkte Duplikate
    /// zusammengefasst. Geschlossene Polylinien bleiben geschlossen, solange
    /// mindestens 3 unterschiedliche Vertices übrig sind.
    pub fn spliced_without(&self, vertex_id: u64) -> Vec<u64> {
        let closed = self.is_closed();
        let mut result: Vec<u64> = Vec::with_capacity(self.vertex_ids.len());
        for &id in self.distinct_ids().iter().filter(|&&id| id != vertex_id) {
            if result.last() != Some(&id) {
                result.push(id);
            }
        }

        if closed {
            while result.len() > 1 && result.first() == result.last() {
                result.pop();
            }
            if result.len() >= 3 {
                result.push(result[0]);
            }
        }
        result
    }
}
