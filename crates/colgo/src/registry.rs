use crate::config::ConfigError;
use crate::engine::Spider;
use crate::sites::{columbia_commission, dalles, hood_river, skamania, stevenson, white_salmon};

fn boxed<S: Spider + 'static>(spider: S) -> Box<dyn Spider> {
    Box::new(spider)
}

/// Every registered spider, validated and ready to crawl.
pub fn spiders() -> Result<Vec<Box<dyn Spider>>, ConfigError> {
    let mut spiders = Vec::new();
    for config in dalles::configs() {
        spiders.push(boxed(config.build()?));
    }
    for config in hood_river::configs() {
        spiders.push(boxed(config.build()?));
    }
    for config in skamania::configs() {
        spiders.push(boxed(config.build()?));
    }
    for config in white_salmon::configs() {
        spiders.push(boxed(config.build()?));
    }
    for config in stevenson::configs() {
        spiders.push(boxed(config.build()?));
    }
    for config in columbia_commission::configs() {
        spiders.push(boxed(config.build()?));
    }
    Ok(spiders)
}

pub fn find(name: &str) -> Result<Option<Box<dyn Spider>>, ConfigError> {
    Ok(spiders()?.into_iter().find(|s| s.name() == name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_registry_builds_every_spider() {
        let spiders = spiders().expect("registered configs are valid");
        assert_eq!(spiders.len(), 5 + 8 + 3 + 3 + 2 + 1);

        let names: HashSet<&str> = spiders.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), spiders.len(), "spider names are unique");
        assert!(spiders.iter().all(|s| s.name().starts_with("colgo_")));
        assert!(spiders.iter().all(|s| !s.agency().is_empty()));
    }

    #[test]
    fn test_find() {
        let spider = find("colgo_ska_bocc")
            .expect("registered configs are valid")
            .expect("bocc spider is registered");
        assert_eq!(spider.agency(), "Board of County Commissioners");
        assert_eq!(spider.family(), "document-center");
        assert!(find("colgo_nowhere").expect("registered configs are valid").is_none());
    }
}
