//! The static diagnostic catalog.
//!
//! Every error MeowLang can raise is listed here under a stable code. The
//! renderer in [`crate::report`] pulls the severity, both message styles,
//! the suggestion and the optional example from this table.

use std::fmt;

/// Severity tier shown in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Griffure {
  Legere,
  Moyenne,
  Grave,
}

impl Griffure {
  /// Mood emoji rendered on the `Humeur du chat` line.
  pub fn mood(&self) -> &'static str {
    match self {
      Griffure::Legere => "😼",
      Griffure::Moyenne => "😾",
      Griffure::Grave => "🙀",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Griffure::Legere => "griffure légère",
      Griffure::Moyenne => "griffure moyenne",
      Griffure::Grave => "griffure grave",
    }
  }
}

/// A diagnostic code. Ranges partition by kind: structure `E0xx`, syntax
/// `E1xx`, names and types `E2xx`, loops `E4xx`, arithmetic `E5xx`,
/// functions `E6xx`, collections `E7xx`, I/O `E8xx`, critical `E9xx`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Code {
  E000,
  E001,
  E002,
  E100,
  E101,
  E102,
  E103,
  E104,
  E105,
  E106,
  E200,
  E201,
  E202,
  E401,
  E501,
  E502,
  E503,
  E601,
  E602,
  E603,
  E701,
  E702,
  E703,
  E704,
  E705,
  E801,
  E802,
  E901,
  E902,
}

impl Code {
  pub fn as_str(&self) -> &'static str {
    self.info().code
  }

  /// Critical errors bypass `essayer`/`sauf` handlers.
  pub fn is_critical(&self) -> bool {
    matches!(self, Code::E000 | Code::E901 | Code::E902)
  }

  pub fn griffure(&self) -> Griffure {
    self.info().griffure
  }

  pub fn info(&self) -> &'static DiagInfo {
    use Code::*;
    match self {
      E000 => &DiagInfo {
        code: "E000",
        griffure: Griffure::Grave,
        kind: "Erreur interne",
        technical: "invariant interne violé",
        playful: "Le chat a vu quelque chose qu'aucun chat n'aurait dû voir.",
        suggestion: "Signale ce problème aux mainteneurs de MeowLang avec ton programme.",
        example: None,
      },
      E001 => &DiagInfo {
        code: "E001",
        griffure: Griffure::Grave,
        kind: "Erreur de structure",
        technical: "le programme doit commencer par `miaou`",
        playful: "Le chat refuse de travailler sans être salué d'abord !",
        suggestion: "Ajoute `miaou` sur la première ligne de ton fichier.",
        example: Some("miaou\n    ecrire \"bonjour\"\nmeow"),
      },
      E002 => &DiagInfo {
        code: "E002",
        griffure: Griffure::Grave,
        kind: "Erreur de structure",
        technical: "le programme doit se terminer par `meow`",
        playful: "Le chat attend toujours qu'on lui dise au revoir.",
        suggestion: "Ajoute `meow` sur la dernière ligne de ton fichier.",
        example: Some("miaou\n    ecrire \"bonjour\"\nmeow"),
      },
      E100 => &DiagInfo {
        code: "E100",
        griffure: Griffure::Moyenne,
        kind: "Erreur de syntaxe",
        technical: "symbole inattendu",
        playful: "Le chat penche la tête : il ne comprend pas ce symbole ici.",
        suggestion: "Relis la ligne et vérifie l'ordre des mots et des symboles.",
        example: None,
      },
      E101 => &DiagInfo {
        code: "E101",
        griffure: Griffure::Moyenne,
        kind: "Erreur d'indentation",
        technical: "mélange de tabulations et d'espaces dans l'indentation",
        playful: "Le chat s'emmêle les pattes entre les tabulations et les espaces.",
        suggestion: "Choisis les espaces OU les tabulations pour indenter, jamais les deux.",
        example: None,
      },
      E102 => &DiagInfo {
        code: "E102",
        griffure: Griffure::Moyenne,
        kind: "Erreur d'indentation",
        technical: "désindentation vers un niveau inconnu",
        playful: "Le chat est redescendu sur une marche qui n'existe pas.",
        suggestion: "Aligne la ligne sur un niveau d'indentation déjà ouvert.",
        example: None,
      },
      E103 => &DiagInfo {
        code: "E103",
        griffure: Griffure::Moyenne,
        kind: "Erreur de syntaxe",
        technical: "chaîne de caractères non terminée",
        playful: "Le chat a tiré sur le fil de la pelote et n'a jamais trouvé le bout.",
        suggestion: "Ferme la chaîne avec un guillemet `\"` avant la fin de la ligne.",
        example: Some("ecrire \"bonjour\""),
      },
      E104 => &DiagInfo {
        code: "E104",
        griffure: Griffure::Legere,
        kind: "Erreur de syntaxe",
        technical: "deux-points `:` attendus avant le bloc",
        playful: "Le chat attend les deux-points comme il attend ses croquettes.",
        suggestion: "Termine la ligne d'en-tête par `:` avant d'indenter le bloc.",
        example: Some("si age >= 18:\n    ecrire \"majeur\""),
      },
      E105 => &DiagInfo {
        code: "E105",
        griffure: Griffure::Moyenne,
        kind: "Erreur de syntaxe",
        technical: "délimiteur fermant manquant",
        playful: "Le chat est entré dans le carton mais personne n'a refermé le couvercle.",
        suggestion: "Ferme chaque `(` avec `)` et chaque `[` avec `]`.",
        example: None,
      },
      E106 => &DiagInfo {
        code: "E106",
        griffure: Griffure::Legere,
        kind: "Erreur de syntaxe",
        technical: "bloc vide",
        playful: "Le chat a ouvert la boîte : elle est vide, quelle déception.",
        suggestion: "Écris au moins une instruction indentée dans le bloc.",
        example: None,
      },
      E200 => &DiagInfo {
        code: "E200",
        griffure: Griffure::Moyenne,
        kind: "Erreur de nom",
        technical: "nom non défini",
        playful: "Le chat a appelé, mais personne ne porte ce nom dans la maison.",
        suggestion: "Vérifie l'orthographe du nom ou définis-le avant de l'utiliser.",
        example: Some("x = 5\necrire x"),
      },
      E201 => &DiagInfo {
        code: "E201",
        griffure: Griffure::Moyenne,
        kind: "Erreur de nom",
        technical: "membre inconnu",
        playful: "Le chat a fouillé tout le module sans trouver ce membre.",
        suggestion: "Vérifie les noms exportés par le module importé.",
        example: None,
      },
      E202 => &DiagInfo {
        code: "E202",
        griffure: Griffure::Moyenne,
        kind: "Erreur de type",
        technical: "type d'opérande invalide",
        playful: "Le chat ne sait pas additionner une pelote et un poisson.",
        suggestion: "Assure-toi que les opérandes ont des types compatibles.",
        example: None,
      },
      E401 => &DiagInfo {
        code: "E401",
        griffure: Griffure::Moyenne,
        kind: "Erreur de boucle",
        technical: "`stop` ou `suivant` en dehors d'une boucle",
        playful: "Le chat veut sortir d'une boucle dans laquelle il n'est jamais entré.",
        suggestion: "Utilise `stop` et `suivant` uniquement dans `tant que`, `repeter` ou `pour chaque`.",
        example: None,
      },
      E501 => &DiagInfo {
        code: "E501",
        griffure: Griffure::Moyenne,
        kind: "Erreur arithmétique",
        technical: "division par zéro",
        playful: "Le chat a essayé de partager ses croquettes entre zéro chats.",
        suggestion: "Vérifie que le diviseur n'est jamais zéro avant de diviser.",
        example: Some("si b != 0:\n    ecrire a / b"),
      },
      E502 => &DiagInfo {
        code: "E502",
        griffure: Griffure::Moyenne,
        kind: "Erreur arithmétique",
        technical: "comparaison non définie pour ces types",
        playful: "Le chat ne sait pas si un poisson est plus grand qu'un mensonge.",
        suggestion: "Compare des nombres entre eux ou des textes entre eux.",
        example: None,
      },
      E503 => &DiagInfo {
        code: "E503",
        griffure: Griffure::Moyenne,
        kind: "Erreur de boucle",
        technical: "nombre de répétitions invalide",
        playful: "Le chat ne sait pas miauler un nombre négatif de fois.",
        suggestion: "Donne à `repeter` un nombre entier positif ou nul.",
        example: Some("repeter 3 fois:\n    ecrire compteur"),
      },
      E601 => &DiagInfo {
        code: "E601",
        griffure: Griffure::Moyenne,
        kind: "Erreur de fonction",
        technical: "mauvais nombre d'arguments",
        playful: "Le chat a reçu trop ou pas assez de croquettes pour cette recette.",
        suggestion: "Appelle la fonction avec exactement les paramètres qu'elle déclare.",
        example: None,
      },
      E602 => &DiagInfo {
        code: "E602",
        griffure: Griffure::Moyenne,
        kind: "Erreur de fonction",
        technical: "cette valeur n'est pas appelable",
        playful: "Le chat a beau appuyer dessus, cette valeur ne fait rien.",
        suggestion: "Seules les fonctions et les fonctions natives peuvent être appelées.",
        example: None,
      },
      E603 => &DiagInfo {
        code: "E603",
        griffure: Griffure::Moyenne,
        kind: "Erreur de fonction",
        technical: "`retour` en dehors d'une fonction",
        playful: "Le chat veut rentrer à la maison, mais il est déjà à la maison.",
        suggestion: "Utilise `retour` uniquement dans le corps d'une `fonction`.",
        example: None,
      },
      E701 => &DiagInfo {
        code: "E701",
        griffure: Griffure::Moyenne,
        kind: "Erreur de collection",
        technical: "cette valeur n'est pas itérable",
        playful: "Le chat tourne autour, mais il n'y a rien à parcourir là-dedans.",
        suggestion: "`pour chaque` parcourt une liste, un dictionnaire ou un texte.",
        example: Some("pour chaque x dans liste(1, 2, 3):\n    ecrire x"),
      },
      E702 => &DiagInfo {
        code: "E702",
        griffure: Griffure::Moyenne,
        kind: "Erreur de collection",
        technical: "indice hors limites",
        playful: "Le chat a sauté plus loin que le bout de l'étagère.",
        suggestion: "Un indice valide va de 0 à `longueur(liste) - 1`.",
        example: None,
      },
      E703 => &DiagInfo {
        code: "E703",
        griffure: Griffure::Moyenne,
        kind: "Erreur de collection",
        technical: "clé absente du dictionnaire",
        playful: "Le chat a gratté partout : cette clé n'est pas sous le tapis.",
        suggestion: "Vérifie la clé avec `contient` avant de la lire.",
        example: None,
      },
      E704 => &DiagInfo {
        code: "E704",
        griffure: Griffure::Moyenne,
        kind: "Erreur de collection",
        technical: "type d'indice invalide",
        playful: "Le chat ne peut pas ouvrir cette porte avec cette clé-là.",
        suggestion: "Indexe les listes avec des entiers et les dictionnaires avec leurs clés.",
        example: None,
      },
      E705 => &DiagInfo {
        code: "E705",
        griffure: Griffure::Moyenne,
        kind: "Erreur de collection",
        technical: "cette valeur ne peut pas servir de clé",
        playful: "Le chat refuse d'accrocher sa médaille à une clé aussi glissante.",
        suggestion: "Les clés de dictionnaire sont des textes, des entiers ou des booléens.",
        example: None,
      },
      E801 => &DiagInfo {
        code: "E801",
        griffure: Griffure::Moyenne,
        kind: "Erreur d'entrée/sortie",
        technical: "opération sur fichier impossible",
        playful: "Le chat griffe la porte du fichier, mais elle ne s'ouvre pas.",
        suggestion: "Vérifie le chemin du fichier et le mode d'ouverture.",
        example: Some("f = ouvrir(\"notes.txt\", \"lecture\")"),
      },
      E802 => &DiagInfo {
        code: "E802",
        griffure: Griffure::Moyenne,
        kind: "Erreur d'entrée/sortie",
        technical: "opération sur un fichier fermé",
        playful: "Le chat miaule devant une porte définitivement fermée.",
        suggestion: "N'utilise plus un fichier après `fermer`.",
        example: None,
      },
      E901 => &DiagInfo {
        code: "E901",
        griffure: Griffure::Grave,
        kind: "Erreur critique",
        technical: "module introuvable",
        playful: "Le chat a cherché ce module dans tous ses cartons préférés, en vain.",
        suggestion: "Place `<nom>.miaou` à côté du script ou dans MEOWLANG_PATH.",
        example: Some("importer util\necrire util.doubler(21)"),
      },
      E902 => &DiagInfo {
        code: "E902",
        griffure: Griffure::Grave,
        kind: "Erreur critique",
        technical: "le chargement du module a échoué",
        playful: "Le chat a ouvert le carton du module : tout était cassé dedans.",
        suggestion: "Corrige d'abord les erreurs dans le module importé.",
        example: None,
      },
    }
  }
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One catalog entry.
pub struct DiagInfo {
  pub code: &'static str,
  pub griffure: Griffure,
  /// Short French type name, e.g. `Erreur arithmétique`.
  pub kind: &'static str,
  /// Technical message used when the raise site adds no detail.
  pub technical: &'static str,
  pub playful: &'static str,
  pub suggestion: &'static str,
  pub example: Option<&'static str>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_render_and_classify() {
    assert_eq!(Code::E501.to_string(), "E501");
    assert_eq!(Code::E501.griffure(), Griffure::Moyenne);
    assert!(!Code::E501.is_critical());
    assert!(Code::E901.is_critical());
    assert!(Code::E000.is_critical());
  }

  #[test]
  fn every_entry_is_filled() {
    use Code::*;
    let all = [
      E000, E001, E002, E100, E101, E102, E103, E104, E105, E106, E200, E201, E202, E401, E501,
      E502, E503, E601, E602, E603, E701, E702, E703, E704, E705, E801, E802, E901, E902,
    ];
    for code in all {
      let info = code.info();
      assert_eq!(info.code, code.as_str());
      assert!(!info.technical.is_empty());
      assert!(!info.playful.is_empty());
      assert!(!info.suggestion.is_empty());
    }
  }
}
