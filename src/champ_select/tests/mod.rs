// Tests for the champ select watcher



#[cfg(test)]
mod test_champion_changes;




#[cfg(test)]
mod test_customization;
