//! Known portal installations by region.
//!
//! Some regions run several independent portals; those are absent here and need an explicit URL.

/// Region name to portal base URL, sorted by name.
pub const REGIONS: &[(&str, &str)] = &[
    ("Алтайский край", "https://netschool.edu22.info"),
    ("Амурская область", "https://region.obramur.ru"),
    ("Забайкальский край", "https://region.zabedu.ru"),
    ("Калужская область", "https://edu.admoblkaluga.ru:444"),
    ("Камчатский край", "https://school.sgo41.ru"),
    ("Костромская область", "https://netschool.eduportal44.ru"),
    ("Краснодарский край", "https://sgo.rso23.ru"),
    ("Ленинградская область", "https://e-school.obr.lenreg.ru"),
    ("Приморский край", "https://sgo.prim-edu.ru"),
    ("Республика Алтай", "https://sgo.altaiobr04.ru"),
    ("Республика Бурятия", "https://deti.obr03.ru"),
    ("Республика Ингушетия", "https://sgo.edu-ri.ru"),
    ("Республика Коми", "https://giseo.rkomi.ru"),
    ("Республика Марий Эл", "https://sgo.mari-el.gov.ru"),
    ("Республика Мордовия", "https://sgo.e-mordovia.ru"),
    ("Республика Саха (Якутия)", "https://sgo.e-yakutia.ru"),
    ("Рязанская область", "https://e-school.ryazan.gov.ru"),
    ("Самарская область", "https://asurso.ru"),
    ("Сахалинская область", "https://netcity.admsakhalin.ru:11111"),
    ("Тверская область", "https://sgo.tvobr.ru"),
    ("Томская область", "https://sgo.tomedu.ru"),
    ("Ульяновская область", "https://sgo.cit73.ru"),
    ("Челябинская область", "https://sgo.edu-74.ru"),
    ("Черноголовка", "https://journal.nschg.ru"),
    ("Чувашская Республика", "http://net-school.cap.ru"),
    ("Ямало-Ненецкий автономный округ", "https://sgo.yanao.ru"),
];

/// Sorted region names.
pub fn list_regions() -> Vec<&'static str> {
    let mut names: Vec<_> = REGIONS.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    names
}

/// Finds a portal URL by region name.
///
/// Matching is case-insensitive: an exact name wins, otherwise the query must be a substring of
/// exactly one name. Ambiguous and unknown queries give `None`.
pub fn get_url(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();

    if let Some((_, url)) = REGIONS
        .iter()
        .find(|(name, _)| name.to_lowercase() == query)
    {
        return Some(url);
    }

    let mut matches = REGIONS
        .iter()
        .filter(|(name, _)| name.to_lowercase().contains(&query));
    match (matches.next(), matches.next()) {
        (Some((_, url)), None) => Some(url),
        _ => None,
    }
}

/// Returns `url_or_region` unchanged when it is a URL, otherwise looks the region up.
pub fn resolve_url(url_or_region: &str) -> Option<String> {
    if url_or_region.starts_with("http://") || url_or_region.starts_with("https://") {
        return Some(url_or_region.to_owned());
    }
    get_url(url_or_region).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_complete() {
        assert_eq!(REGIONS.len(), 26);
        let names: Vec<_> = REGIONS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, list_regions());
        assert!(REGIONS
            .iter()
            .all(|(_, url)| url.starts_with("http://") || url.starts_with("https://")));
    }

    #[test]
    fn test_exact_and_partial_lookup() {
        assert_eq!(get_url("Челябинская область"), Some("https://sgo.edu-74.ru"));
        assert_eq!(get_url("челябинская"), Some("https://sgo.edu-74.ru"));
        assert_eq!(get_url("ЧЕРНОГОЛОВКА"), Some("https://journal.nschg.ru"));
    }

    #[test]
    fn test_ambiguous_unknown_and_empty() {
        assert_eq!(get_url("Республика"), None);
        assert_eq!(get_url("Несуществующий регион"), None);
        assert_eq!(get_url(""), None);
    }

    #[test]
    fn test_every_region_is_findable() {
        for (name, url) in REGIONS {
            assert_eq!(get_url(name), Some(*url), "{name}");
        }
    }

    #[test]
    fn test_resolve_url_passthrough() {
        assert_eq!(
            resolve_url("https://127.0.0.1:1").as_deref(),
            Some("https://127.0.0.1:1")
        );
        assert_eq!(
            resolve_url("Самарская область").as_deref(),
            Some("https://asurso.ru")
        );
        assert_eq!(resolve_url("Неизвестная область"), None);
    }
}
