//! Tri fusion et recherche dichotomique sur des listes de morceaux
//!
//! Les deux algorithmes sont volontairement textbook :
//!
//! - [`merge_sort`] découpe au milieu, trie récursivement chaque moitié puis
//!   fusionne en comparant la clé avec `<`. L'élément de gauche n'est pris que
//!   s'il est strictement inférieur : à égalité, c'est celui de droite qui
//!   passe en premier. Le tri n'est donc pas stable.
//! - [`binary_search`] suppose une liste triée par ordre croissant sur la même
//!   clé. Sur une liste non triée le résultat n'a pas de sens.
//!
//! Les variantes `*_by_key` travaillent sur n'importe quel type ; les
//! variantes [`sort_songs`] / [`search_songs`] acceptent le nom du champ et
//! échouent avec [`Error::MissingField`](crate::Error::MissingField) avant
//! tout travail si ce nom n'est pas un champ de [`Song`].

use crate::model::{Song, SongField};
use crate::Result;

/// Tri fusion générique sur une clé extraite de chaque élément
///
/// Retourne un nouveau vecteur ; l'entrée n'est pas modifiée.
pub fn merge_sort_by_key<T, K, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: PartialOrd + ?Sized,
    F: Fn(&T) -> &K,
{
    sort_slice(items, &key)
}

fn sort_slice<T, K, F>(items: &[T], key: &F) -> Vec<T>
where
    T: Clone,
    K: PartialOrd + ?Sized,
    F: Fn(&T) -> &K,
{
    if items.len() <= 1 {
        return items.to_vec();
    }

    let mid = items.len() / 2;
    let left = sort_slice(&items[..mid], key);
    let right = sort_slice(&items[mid..], key);

    merge(left, right, key)
}

fn merge<T, K, F>(left: Vec<T>, right: Vec<T>, key: &F) -> Vec<T>
where
    K: PartialOrd + ?Sized,
    F: Fn(&T) -> &K,
{
    let mut sorted = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => key(l) < key(r),
            _ => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        sorted.extend(next);
    }

    sorted.extend(left);
    sorted.extend(right);
    sorted
}

/// Recherche dichotomique générique
///
/// Retourne le premier élément rencontré dont la clé vaut `target`.
pub fn binary_search_by_key<'a, T, K, F>(sorted: &'a [T], target: &K, key: F) -> Option<&'a T>
where
    K: PartialOrd + ?Sized,
    F: Fn(&T) -> &K,
{
    // `right` est exclusif ; `mid` correspond au milieu de [left, right - 1]
    let mut left = 0usize;
    let mut right = sorted.len();

    while left < right {
        let mid = left + (right - 1 - left) / 2;
        let candidate = &sorted[mid];
        let value = key(candidate);

        if value == target {
            return Some(candidate);
        } else if value < target {
            left = mid + 1;
        } else {
            right = mid;
        }
    }

    None
}

/// Trie des morceaux sur un champ
pub fn merge_sort(songs: &[Song], key: SongField) -> Vec<Song> {
    merge_sort_by_key(songs, |song: &Song| song.field(key))
}

/// Cherche un morceau dans une liste triée sur `key`
pub fn binary_search<'a>(sorted: &'a [Song], target: &str, key: SongField) -> Option<&'a Song> {
    binary_search_by_key(sorted, target, |song: &Song| song.field(key))
}

/// Comme [`merge_sort`], avec le nom du champ (`"name"`, `"artist"`, `"genre"`)
pub fn sort_songs(songs: &[Song], key: &str) -> Result<Vec<Song>> {
    let field = key.parse::<SongField>()?;
    Ok(merge_sort(songs, field))
}

/// Comme [`binary_search`], avec le nom du champ
pub fn search_songs<'a>(sorted: &'a [Song], target: &str, key: &str) -> Result<Option<&'a Song>> {
    let field = key.parse::<SongField>()?;
    Ok(binary_search(sorted, target, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewSong;
    use crate::Error;

    fn song(id: &str, name: &str, artist: &str, genre: &str) -> Song {
        Song::new(id.to_string(), NewSong::new(name, artist, genre))
    }

    fn library() -> Vec<Song> {
        vec![
            song("song_1", "Moon", "Zed", "Rock"),
            song("song_2", "Alpha", "Mia", "Jazz"),
            song("song_3", "Echo", "Abe", "Rock"),
            song("song_4", "Blue", "Kai", "Pop"),
            song("song_5", "Delta", "Abe", "Jazz"),
            song("song_6", "Car", "Lou", "Folk"),
        ]
    }

    fn keys(songs: &[Song], field: SongField) -> Vec<&str> {
        songs.iter().map(|s| s.field(field)).collect()
    }

    #[test]
    fn sorts_by_each_field() {
        let songs = library();

        let by_name = merge_sort(&songs, SongField::Name);
        assert_eq!(
            keys(&by_name, SongField::Name),
            vec!["Alpha", "Blue", "Car", "Delta", "Echo", "Moon"]
        );

        let by_genre = merge_sort(&songs, SongField::Genre);
        let genres = keys(&by_genre, SongField::Genre);
        assert!(genres.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn sort_is_a_permutation_and_idempotent() {
        let songs = library();
        let once = merge_sort(&songs, SongField::Artist);
        let twice = merge_sort(&once, SongField::Artist);

        assert_eq!(once.len(), songs.len());
        let mut ids: Vec<_> = once.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["song_1", "song_2", "song_3", "song_4", "song_5", "song_6"]);
        assert_eq!(
            keys(&once, SongField::Artist),
            keys(&twice, SongField::Artist)
        );
    }

    #[test]
    fn ties_take_the_right_element_first() {
        let songs = vec![
            song("song_1", "Same", "First", "Rock"),
            song("song_2", "Same", "Second", "Rock"),
        ];
        let sorted = merge_sort(&songs, SongField::Name);
        assert_eq!(sorted[0].id, "song_2");
        assert_eq!(sorted[1].id, "song_1");
    }

    #[test]
    fn trivial_inputs_are_copied() {
        assert!(merge_sort(&[], SongField::Name).is_empty());
        let single = vec![song("song_1", "A", "X", "Rock")];
        assert_eq!(merge_sort(&single, SongField::Name), single);
    }

    #[test]
    fn two_song_scenario_orders_by_name() {
        let song_1 = song("song_1", "A", "X", "Rock");
        let song_2 = song("song_2", "B", "Y", "Pop");
        let sorted = merge_sort(&[song_2.clone(), song_1.clone()], SongField::Name);
        assert_eq!(sorted, vec![song_1, song_2]);
    }

    #[test]
    fn binary_search_finds_every_present_target() {
        let sorted = merge_sort(&library(), SongField::Name);
        for expected in &sorted {
            let found = binary_search(&sorted, &expected.name, SongField::Name).unwrap();
            assert_eq!(found.name, expected.name);
        }
    }

    #[test]
    fn binary_search_with_duplicates_returns_a_matching_record() {
        let sorted = merge_sort(&library(), SongField::Genre);
        let found = binary_search(&sorted, "Jazz", SongField::Genre).unwrap();
        assert_eq!(found.genre, "Jazz");
    }

    #[test]
    fn binary_search_misses_absent_targets() {
        let sorted = merge_sort(&library(), SongField::Name);
        assert!(binary_search(&sorted, "Zulu", SongField::Name).is_none());
        assert!(binary_search(&sorted, "Aaa", SongField::Name).is_none());
        assert!(binary_search(&sorted, "Cat", SongField::Name).is_none());
        assert!(binary_search(&[], "Alpha", SongField::Name).is_none());
    }

    #[test]
    fn generic_helpers_work_on_plain_values() {
        let sorted = merge_sort_by_key(&[5, 3, 9, 1, 3], |n: &i32| n);
        assert_eq!(sorted, vec![1, 3, 3, 5, 9]);
        assert_eq!(binary_search_by_key(&sorted, &9, |n: &i32| n), Some(&9));
        assert_eq!(binary_search_by_key(&sorted, &4, |n: &i32| n), None);
    }

    #[test]
    fn unknown_key_aborts_with_missing_field() {
        let songs = library();
        assert!(matches!(
            sort_songs(&songs, "album"),
            Err(Error::MissingField(ref f)) if f == "album"
        ));

        let sorted = sort_songs(&songs, "artist").unwrap();
        assert!(matches!(
            search_songs(&sorted, "Abe", "year"),
            Err(Error::MissingField(_))
        ));
        assert_eq!(
            search_songs(&sorted, "Abe", "artist").unwrap().unwrap().artist,
            "Abe"
        );
    }
}
